pub mod schema;
pub mod country;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use thiserror::Error;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent; safe to run on every start.
pub const PROVISION_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    name_key          TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    capital           TEXT,
    region            TEXT,
    population        BIGINT NOT NULL DEFAULT 0 CHECK (population >= 0),
    currency_code     TEXT,
    exchange_rate     DOUBLE PRECISION,
    estimated_gdp     DOUBLE PRECISION,
    flag_url          TEXT,
    last_refreshed_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS countries_region_lower_idx ON countries (lower(region));
CREATE INDEX IF NOT EXISTS countries_currency_lower_idx ON countries (lower(currency_code));
"#;

#[derive(Debug, Error)]
pub enum BuildPoolError {
    #[error("BuildPool: {source}")]
    BuildPool {
        #[from]
        source: r2d2::Error,
    },
}

pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, BuildPoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|source| BuildPoolError::BuildPool { source })
}

#[derive(Debug, Error)]
pub enum ProvisionSchemaError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("ProvisionSchema: {source}")]
    ProvisionSchema {
        #[from]
        source: diesel::result::Error,
    },
}

/// Creates the `countries` table and its indexes when missing.
pub fn provision_schema(pool: &PgPool) -> Result<(), ProvisionSchemaError> {
    let mut conn = pool
        .get()
        .map_err(|source| ProvisionSchemaError::GetConnectionFromPool { source })?;

    conn.batch_execute(PROVISION_SCHEMA_SQL)
        .map_err(|source| ProvisionSchemaError::ProvisionSchema { source })
}
