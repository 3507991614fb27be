pub mod memory;
pub mod postgres;

pub use memory::MemoryCountryStore;
pub use postgres::PgCountryStore;

use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::{
    country::{
        models::{Country, NewCountry},
        queries::{
            GetCountryByNameError, GetCountryStatusError, GetTopCountriesByGdpError,
            ListCountriesError, UpsertCountriesError,
        },
    },
    ProvisionSchemaError,
};

/// Exact-match filters, compared case-insensitively. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency: Option<String>,
}

/// Descending sort keys for [`CountryStore::list_countries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySort {
    Population,
    Gdp,
}

impl FromStr for CountrySort {
    type Err = UnknownCountrySort;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "population" | "population_desc" => Ok(CountrySort::Population),
            "gdp" | "gdp_desc" | "estimated_gdp" => Ok(CountrySort::Gdp),
            _ => Err(UnknownCountrySort { value: value.to_string() }),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown sort {value:?}, expected \"population\" or \"gdp\"")]
pub struct UnknownCountrySort {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatus {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    UpsertCountries {
        #[from]
        source: UpsertCountriesError,
    },
    #[error(transparent)]
    ListCountries {
        #[from]
        source: ListCountriesError,
    },
    #[error(transparent)]
    GetCountryByName {
        #[from]
        source: GetCountryByNameError,
    },
    #[error(transparent)]
    GetCountryStatus {
        #[from]
        source: GetCountryStatusError,
    },
    #[error(transparent)]
    GetTopCountriesByGdp {
        #[from]
        source: GetTopCountriesByGdpError,
    },
    #[error(transparent)]
    ProvisionSchema {
        #[from]
        source: ProvisionSchemaError,
    },
    #[error("BlockingTask: {source}")]
    BlockingTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Persistence for country rows, keyed case-insensitively by name.
///
/// All methods return `Send` futures so implementations can be shared across
/// axum handlers on the multi-threaded runtime.
pub trait CountryStore: Send + Sync + 'static {
    /// Idempotent schema setup; must complete before any write.
    fn provision(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert-or-update by name key. Returns the number of rows written.
    fn upsert_countries(
        &self,
        rows: Vec<NewCountry>,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Ascending by name unless `sort` is given, then descending by that
    /// field with nulls last and name as tie-breaker.
    fn list_countries(
        &self,
        filter: CountryFilter,
        sort: Option<CountrySort>,
    ) -> impl Future<Output = Result<Vec<Country>, StoreError>> + Send;

    fn get_country_by_name(
        &self,
        name: String,
    ) -> impl Future<Output = Result<Option<Country>, StoreError>> + Send;

    fn status(&self) -> impl Future<Output = Result<StoreStatus, StoreError>> + Send;

    /// Highest `estimated_gdp` first; rows without a value are excluded.
    fn top_by_estimated_gdp(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Country>, StoreError>> + Send;
}
