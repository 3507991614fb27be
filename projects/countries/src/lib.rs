//! Country and currency service
//!
//! - REST API endpoints in `endpoints/`
//! - PostgreSQL schema, models and queries in `db/`
//! - `store/` abstracts persistence behind `CountryStore`
//! - `services/` holds the upstream fetcher, the refresh pipeline and read queries
//! - `utils/summary_image` renders the PNG summary
//! - Requires DATABASE_URL; see `config` for the other variables

pub mod config;
pub mod db;
pub mod endpoints;
pub mod services;
pub mod store;
pub mod utils;
