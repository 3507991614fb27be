use tokio::task::spawn_blocking;
use tracing::debug;

use diesel::PgConnection;

use super::{CountryFilter, CountrySort, CountryStore, StoreError, StoreStatus};
use crate::db::{
    country::{
        models::{Country, NewCountry},
        queries,
    },
    provision_schema, PgPool,
};

/// Diesel-backed store. Every call checks a connection out of the pool on
/// the blocking thread pool.
#[derive(Clone)]
pub struct PgCountryStore {
    pool: PgPool,
}

impl PgCountryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn)
        })
        .await?
    }
}

impl CountryStore for PgCountryStore {
    async fn provision(&self) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        spawn_blocking(move || provision_schema(&pool)).await??;
        Ok(())
    }

    async fn upsert_countries(&self, rows: Vec<NewCountry>) -> Result<usize, StoreError> {
        let written = self
            .with_conn(move |conn| Ok(queries::upsert_countries(conn, &rows)?))
            .await?;
        debug!(written, "upserted countries");
        Ok(written)
    }

    async fn list_countries(
        &self,
        filter: CountryFilter,
        sort: Option<CountrySort>,
    ) -> Result<Vec<Country>, StoreError> {
        self.with_conn(move |conn| Ok(queries::list_countries(conn, &filter, sort)?))
            .await
    }

    async fn get_country_by_name(&self, name: String) -> Result<Option<Country>, StoreError> {
        self.with_conn(move |conn| Ok(queries::get_country_by_name(conn, &name)?))
            .await
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        let (total_countries, last_refreshed_at) = self
            .with_conn(|conn| Ok(queries::get_country_status(conn)?))
            .await?;
        Ok(StoreStatus { total_countries, last_refreshed_at })
    }

    async fn top_by_estimated_gdp(&self, limit: usize) -> Result<Vec<Country>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| Ok(queries::get_top_countries_by_gdp(conn, limit)?))
            .await
    }
}
