use thiserror::Error;

use crate::db::country::models::Country;
use crate::store::{CountryFilter, CountrySort, CountryStore, StoreError, StoreStatus};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("CountryNotFound: {name}")]
    CountryNotFound { name: String },
    #[error(transparent)]
    Store {
        #[from]
        source: StoreError,
    },
}

/// Blank filter values count as absent.
pub async fn list_countries<S: CountryStore>(
    store: &S,
    filter: CountryFilter,
    sort: Option<CountrySort>,
) -> Result<Vec<Country>, QueryError> {
    let filter = CountryFilter {
        region: non_blank(filter.region),
        currency: non_blank(filter.currency),
    };
    Ok(store.list_countries(filter, sort).await?)
}

pub async fn get_country_by_name<S: CountryStore>(
    store: &S,
    name: &str,
) -> Result<Country, QueryError> {
    store
        .get_country_by_name(name.to_string())
        .await?
        .ok_or_else(|| QueryError::CountryNotFound { name: name.to_string() })
}

pub async fn get_status<S: CountryStore>(store: &S) -> Result<StoreStatus, QueryError> {
    Ok(store.status().await?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
