use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::country::models::{name_key, NewCountry};
use crate::services::fetcher::{CountryMetadata, CountrySource, ExchangeRates, FetchError};
use crate::store::{CountryStore, StoreError};
use crate::utils::summary_image::SummaryImage;

/// Scale applied in [`estimate_gdp`]. A placeholder heuristic with no
/// economic derivation; the result is not a real GDP figure.
pub const GDP_SCALE_FACTOR: f64 = 5000.0;

/// Rate used when a country has no currency or the rate table lacks it.
pub const FALLBACK_EXCHANGE_RATE: f64 = 1.0;

pub fn estimate_gdp(population: i64, exchange_rate: f64) -> f64 {
    population as f64 * exchange_rate * GDP_SCALE_FACTOR
}

/// Joins metadata with rates into rows stamped with `refreshed_at`.
///
/// Nameless entries are dropped. A name repeated in the batch (in any case)
/// keeps its first position and its last value.
pub fn build_country_rows(
    metadata: Vec<CountryMetadata>,
    rates: &ExchangeRates,
    refreshed_at: DateTime<Utc>,
) -> Vec<NewCountry> {
    let mut rows: Vec<NewCountry> = Vec::with_capacity(metadata.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for country in metadata {
        let Some(name) = country
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        else {
            continue;
        };

        let currency_code = country.currency_codes.into_iter().next();
        let exchange_rate = currency_code
            .as_ref()
            .and_then(|code| rates.get(code))
            .copied();
        let population = i64::try_from(country.population).unwrap_or(i64::MAX);
        let estimated_gdp =
            estimate_gdp(population, exchange_rate.unwrap_or(FALLBACK_EXCHANGE_RATE));

        let row = NewCountry {
            name_key: name_key(&name),
            name,
            capital: country.capital,
            region: country.region,
            population,
            currency_code,
            exchange_rate,
            estimated_gdp: Some(estimated_gdp),
            flag_url: country.flag_url,
            last_refreshed_at: refreshed_at,
        };

        match positions.get(&row.name_key) {
            Some(&idx) => rows[idx] = row,
            None => {
                positions.insert(row.name_key.clone(), rows.len());
                rows.push(row);
            }
        }
    }

    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub total_countries: usize,
    pub last_refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Fetch: {source}")]
    Fetch {
        #[from]
        source: FetchError,
    },
    #[error("Store: {source}")]
    Store {
        #[from]
        source: StoreError,
    },
}

/// Fetch, join, upsert, then redraw the summary image.
pub struct RefreshPipeline<S, F> {
    store: Arc<S>,
    source: Arc<F>,
    summary: SummaryImage,
    base_currency: String,
}

impl<S, F> RefreshPipeline<S, F>
where
    S: CountryStore,
    F: CountrySource,
{
    pub fn new(
        store: Arc<S>,
        source: Arc<F>,
        summary: SummaryImage,
        base_currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            summary,
            base_currency: base_currency.into(),
        }
    }

    pub fn summary(&self) -> &SummaryImage {
        &self.summary
    }

    pub async fn run(&self) -> Result<RefreshOutcome, RefreshError> {
        info!(base_currency = %self.base_currency, "refreshing countries");

        let (metadata, rates) = tokio::try_join!(
            self.source.fetch_country_metadata(),
            self.source.fetch_exchange_rates(&self.base_currency),
        )?;
        info!(countries = metadata.len(), rates = rates.len(), "fetched upstream data");

        let refreshed_at = Utc::now().trunc_subsecs(6);
        let rows = build_country_rows(metadata, &rates, refreshed_at);
        let total_countries = rows.len();

        self.store.upsert_countries(rows).await?;
        info!(total_countries, %refreshed_at, "countries upserted");

        match self.summary.render_from_store(self.store.as_ref()).await {
            Ok(_) => info!(path = %self.summary.path().display(), "summary image written"),
            Err(err) => warn!(
                path = %self.summary.path().display(),
                error = %err,
                "summary image not regenerated"
            ),
        }

        Ok(RefreshOutcome {
            total_countries,
            last_refreshed_at: refreshed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn meta(name: Option<&str>, population: u64, currencies: &[&str]) -> CountryMetadata {
        CountryMetadata {
            name: name.map(str::to_string),
            population,
            currency_codes: currencies.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
    }

    #[test]
    fn testland_gdp_uses_its_rate() {
        let rates = ExchangeRates::from([("XYZ".to_string(), 2.0)]);
        let rows = build_country_rows(vec![meta(Some("Testland"), 1000, &["XYZ"])], &rates, at());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].currency_code.as_deref(), Some("XYZ"));
        assert_eq!(rows[0].exchange_rate, Some(2.0));
        assert_eq!(rows[0].estimated_gdp, Some(10_000_000.0));
        assert_eq!(rows[0].last_refreshed_at, at());
    }

    #[test]
    fn unknown_or_missing_currency_falls_back_to_one() {
        let rates = ExchangeRates::from([("EUR".to_string(), 0.9)]);
        let rows = build_country_rows(
            vec![meta(Some("Nowhere"), 10, &["QQQ"]), meta(Some("Stateless"), 7, &[])],
            &rates,
            at(),
        );

        assert_eq!(rows[0].exchange_rate, None);
        assert_eq!(rows[0].estimated_gdp, Some(10.0 * GDP_SCALE_FACTOR));
        assert_eq!(rows[1].currency_code, None);
        assert_eq!(rows[1].estimated_gdp, Some(7.0 * GDP_SCALE_FACTOR));
    }

    #[test]
    fn primary_currency_is_first_listed() {
        let rates = ExchangeRates::from([("ZWL".to_string(), 300.0), ("BWP".to_string(), 13.0)]);
        let rows = build_country_rows(vec![meta(Some("Zimbabwe"), 1, &["ZWL", "BWP"])], &rates, at());
        assert_eq!(rows[0].currency_code.as_deref(), Some("ZWL"));
        assert_eq!(rows[0].exchange_rate, Some(300.0));
    }

    #[test]
    fn nameless_entries_are_dropped() {
        let rows = build_country_rows(
            vec![meta(None, 1, &[]), meta(Some("   "), 1, &[]), meta(Some("Kept"), 1, &[])],
            &ExchangeRates::new(),
            at(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Kept");
    }

    #[test]
    fn repeated_names_keep_the_last_value() {
        let rows = build_country_rows(
            vec![
                meta(Some("Congo"), 1, &[]),
                meta(Some("Chad"), 2, &[]),
                meta(Some("CONGO"), 3, &[]),
            ],
            &ExchangeRates::new(),
            at(),
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "CONGO");
        assert_eq!(rows[0].population, 3);
        assert_eq!(rows[1].name, "Chad");
    }

    #[test]
    fn every_row_matches_the_formula() {
        let rates = ExchangeRates::from([
            ("NGN".to_string(), 1532.5),
            ("JPY".to_string(), 149.8),
        ]);
        let rows = build_country_rows(
            vec![
                meta(Some("Nigeria"), 223_804_632, &["NGN"]),
                meta(Some("Japan"), 125_124_989, &["JPY"]),
                meta(Some("Vatican City"), 451, &["EUR"]),
            ],
            &rates,
            at(),
        );

        for row in rows {
            let rate = row.exchange_rate.unwrap_or(FALLBACK_EXCHANGE_RATE);
            assert_eq!(
                row.estimated_gdp,
                Some(row.population as f64 * rate * GDP_SCALE_FACTOR)
            );
        }
    }
}
