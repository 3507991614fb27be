use std::cmp::Ordering;
use std::collections::BTreeMap;

use tokio::sync::RwLock;

use super::{CountryFilter, CountrySort, CountryStore, StoreError, StoreStatus};
use crate::db::country::models::{name_key, Country, NewCountry};

/// In-process store with the same keying, filtering and ordering rules as
/// the PostgreSQL backend, whose name ordering uses the byte-order `"C"`
/// collation. Used as a test double.
#[derive(Debug, Default)]
pub struct MemoryCountryStore {
    rows: RwLock<BTreeMap<String, Country>>,
}

impl MemoryCountryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn matches_ci(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.to_lowercase() == wanted.to_lowercase()),
    }
}

fn gdp_desc_nulls_last(a: &Country, b: &Country) -> Ordering {
    match (a.estimated_gdp, b.estimated_gdp) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl CountryStore for MemoryCountryStore {
    async fn provision(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert_countries(&self, rows: Vec<NewCountry>) -> Result<usize, StoreError> {
        let mut guard = self.rows.write().await;
        let written = rows.len();
        for row in rows {
            guard.insert(row.name_key.clone(), Country::from(row));
        }
        Ok(written)
    }

    async fn list_countries(
        &self,
        filter: CountryFilter,
        sort: Option<CountrySort>,
    ) -> Result<Vec<Country>, StoreError> {
        let guard = self.rows.read().await;
        let mut out: Vec<Country> = guard
            .values()
            .filter(|c| matches_ci(c.region.as_deref(), filter.region.as_deref()))
            .filter(|c| matches_ci(c.currency_code.as_deref(), filter.currency.as_deref()))
            .cloned()
            .collect();

        match sort {
            None => out.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(CountrySort::Population) => {
                out.sort_by(|a, b| b.population.cmp(&a.population).then_with(|| a.name.cmp(&b.name)))
            }
            Some(CountrySort::Gdp) => {
                out.sort_by(|a, b| gdp_desc_nulls_last(a, b).then_with(|| a.name.cmp(&b.name)))
            }
        }

        Ok(out)
    }

    async fn get_country_by_name(&self, name: String) -> Result<Option<Country>, StoreError> {
        Ok(self.rows.read().await.get(&name_key(&name)).cloned())
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        let guard = self.rows.read().await;
        Ok(StoreStatus {
            total_countries: guard.len() as i64,
            last_refreshed_at: guard.values().map(|c| c.last_refreshed_at).max(),
        })
    }

    async fn top_by_estimated_gdp(&self, limit: usize) -> Result<Vec<Country>, StoreError> {
        let guard = self.rows.read().await;
        let mut out: Vec<Country> = guard
            .values()
            .filter(|c| c.estimated_gdp.is_some())
            .cloned()
            .collect();
        out.sort_by(|a, b| gdp_desc_nulls_last(a, b).then_with(|| a.name.cmp(&b.name)));
        out.truncate(limit);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn row(name: &str, region: &str, currency: &str, population: i64, gdp: Option<f64>) -> NewCountry {
        NewCountry {
            name_key: name_key(name),
            name: name.to_string(),
            capital: None,
            region: Some(region.to_string()),
            population,
            currency_code: Some(currency.to_string()),
            exchange_rate: Some(1.0),
            estimated_gdp: gdp,
            flag_url: None,
            last_refreshed_at: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        }
    }

    async fn seeded() -> MemoryCountryStore {
        let store = MemoryCountryStore::new();
        store
            .upsert_countries(vec![
                row("Japan", "Asia", "JPY", 125_000_000, Some(9.0)),
                row("Nigeria", "Africa", "NGN", 220_000_000, Some(3.0)),
                row("India", "Asia", "INR", 1_400_000_000, None),
                row("Ghana", "Africa", "GHS", 33_000_000, Some(5.0)),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn same_name_in_other_case_updates_one_row() {
        let store = seeded().await;
        let mut update = row("JAPAN", "Asia", "JPY", 1, Some(1.0));
        update.last_refreshed_at += Duration::hours(1);

        store.upsert_countries(vec![update.clone()]).await.unwrap();

        assert_eq!(store.len().await, 4);
        let japan = store.get_country_by_name("japan".into()).await.unwrap().unwrap();
        assert_eq!(japan.population, 1);
        assert_eq!(japan.last_refreshed_at, update.last_refreshed_at);
    }

    #[tokio::test]
    async fn list_defaults_to_name_order() {
        let store = seeded().await;
        let names: Vec<_> = store
            .list_countries(CountryFilter::default(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Ghana", "India", "Japan", "Nigeria"]);
    }

    #[tokio::test]
    async fn names_sort_by_bytes() {
        let store = MemoryCountryStore::new();
        store
            .upsert_countries(vec![
                row("Åland Islands", "Europe", "EUR", 30_000, Some(1.0)),
                row("Zambia", "Africa", "ZMW", 20_000_000, Some(1.0)),
                row("Albania", "Europe", "ALL", 2_800_000, Some(1.0)),
            ])
            .await
            .unwrap();

        let names: Vec<_> = store
            .list_countries(CountryFilter::default(), Some(CountrySort::Gdp))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Albania", "Zambia", "Åland Islands"]);
    }

    #[tokio::test]
    async fn list_filters_case_insensitively() {
        let store = seeded().await;
        let filter = CountryFilter { region: Some("asia".into()), currency: None };
        let asia = store.list_countries(filter, None).await.unwrap();
        assert_eq!(asia.len(), 2);
        assert!(asia.iter().all(|c| c.region.as_deref() == Some("Asia")));

        let filter = CountryFilter { region: Some("Africa".into()), currency: Some("ngn".into()) };
        let nigeria = store.list_countries(filter, None).await.unwrap();
        assert_eq!(nigeria.len(), 1);
        assert_eq!(nigeria[0].name, "Nigeria");
    }

    #[tokio::test]
    async fn gdp_sort_puts_nulls_last() {
        let store = seeded().await;
        let names: Vec<_> = store
            .list_countries(CountryFilter::default(), Some(CountrySort::Gdp))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Japan", "Ghana", "Nigeria", "India"]);
    }

    #[tokio::test]
    async fn top_excludes_missing_gdp() {
        let store = seeded().await;
        let top = store.top_by_estimated_gdp(5).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "Japan");

        let top_one = store.top_by_estimated_gdp(1).await.unwrap();
        assert_eq!(top_one.len(), 1);
    }

    #[tokio::test]
    async fn status_counts_rows() {
        let store = MemoryCountryStore::new();
        let empty = store.status().await.unwrap();
        assert_eq!(empty.total_countries, 0);
        assert!(empty.last_refreshed_at.is_none());

        let store = seeded().await;
        let status = store.status().await.unwrap();
        assert_eq!(status.total_countries, 4);
        assert_eq!(
            status.last_refreshed_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
        );
    }
}
