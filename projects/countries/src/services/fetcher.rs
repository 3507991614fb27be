use std::collections::HashMap;
use std::future::Future;

use interfaces_open_er_api_latest_rates::{
    index::{fetch_latest_rates, FetchLatestRatesError, LatestRatesResult},
    models::LatestRatesResponse,
};
use interfaces_restcountries_countries::{
    index::{fetch_all_countries, FetchAllCountriesError, RestCountriesResult},
    models::RestCountry,
};
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Country metadata as the refresh pipeline consumes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryMetadata {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    /// In upstream order; the first one is the primary currency.
    pub currency_codes: Vec<String>,
    pub flag_url: Option<String>,
}

/// Currency code to units of that currency per one unit of the base.
pub type ExchangeRates = HashMap<String, f64>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("FetchAllCountries: {source}")]
    FetchAllCountries {
        #[from]
        source: FetchAllCountriesError,
    },

    #[error("FetchLatestRates: {source}")]
    FetchLatestRates {
        #[from]
        source: FetchLatestRatesError,
    },

    #[error("UnexpectedStatus: {service} answered {status}")]
    UnexpectedStatus {
        service: &'static str,
        status: StatusCode,
    },

    #[error("DeserializeResponseBody: {service}: {source}")]
    DeserializeResponseBody {
        service: &'static str,
        source: serde_json::Error,
    },

    #[error("RatesUnavailable: {error_type}")]
    RatesUnavailable {
        error_type: String,
    },
}

/// Upstream provider of country metadata and exchange rates.
pub trait CountrySource: Send + Sync + 'static {
    fn fetch_country_metadata(
        &self,
    ) -> impl Future<Output = Result<Vec<CountryMetadata>, FetchError>> + Send;

    fn fetch_exchange_rates(
        &self,
        base: &str,
    ) -> impl Future<Output = Result<ExchangeRates, FetchError>> + Send;
}

const REST_COUNTRIES: &str = "restcountries";
const OPEN_ER_API: &str = "open.er-api";

/// Talks to REST Countries and open.er-api over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpCountrySource {
    client: Client,
    countries_url: String,
    rates_url: String,
}

impl HttpCountrySource {
    pub fn new(client: Client, countries_url: impl Into<String>, rates_url: impl Into<String>) -> Self {
        Self {
            client,
            countries_url: countries_url.into(),
            rates_url: rates_url.into(),
        }
    }
}

impl CountrySource for HttpCountrySource {
    async fn fetch_country_metadata(&self) -> Result<Vec<CountryMetadata>, FetchError> {
        let RestCountriesResult { body, status } =
            fetch_all_countries(&self.client, &self.countries_url).await?;
        parse_countries(status, &body)
    }

    async fn fetch_exchange_rates(&self, base: &str) -> Result<ExchangeRates, FetchError> {
        let LatestRatesResult { body, status } =
            fetch_latest_rates(&self.client, &self.rates_url, base).await?;
        parse_rates(status, &body)
    }
}

pub fn parse_countries(status: StatusCode, body: &str) -> Result<Vec<CountryMetadata>, FetchError> {
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus { service: REST_COUNTRIES, status });
    }

    let parsed: Vec<RestCountry> = serde_json::from_str(body).map_err(|source| {
        FetchError::DeserializeResponseBody { service: REST_COUNTRIES, source }
    })?;

    Ok(parsed.into_iter().map(CountryMetadata::from).collect())
}

pub fn parse_rates(status: StatusCode, body: &str) -> Result<ExchangeRates, FetchError> {
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus { service: OPEN_ER_API, status });
    }

    let parsed: LatestRatesResponse = serde_json::from_str(body).map_err(|source| {
        FetchError::DeserializeResponseBody { service: OPEN_ER_API, source }
    })?;

    if !parsed.is_success() {
        return Err(FetchError::RatesUnavailable {
            error_type: parsed.error_type.unwrap_or_else(|| parsed.result.clone()),
        });
    }

    Ok(parsed.rates)
}

impl From<RestCountry> for CountryMetadata {
    fn from(country: RestCountry) -> Self {
        CountryMetadata {
            name: country.common_name().map(str::to_string),
            capital: country.first_capital().map(str::to_string),
            currency_codes: country.currency_codes(),
            region: country.region.filter(|r| !r.is_empty()),
            population: country.population.unwrap_or(0),
            flag_url: country.flags.and_then(|f| f.png),
        }
    }
}
