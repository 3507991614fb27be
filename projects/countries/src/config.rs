use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use interfaces_open_er_api_latest_rates::index::DEFAULT_RATES_URL;
use interfaces_restcountries_countries::index::DEFAULT_COUNTRIES_URL;
use thiserror::Error;
use utils_trace::TraceFormat;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_BASE_CURRENCY: &str = "USD";
pub const DEFAULT_SUMMARY_IMAGE_PATH: &str = "cache/summary.png";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MissingVariable: {key} must be set")]
    MissingVariable { key: &'static str },
    #[error("InvalidVariable: {key}={value:?}: {reason}")]
    InvalidVariable {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub database_pool_size: u32,
    pub base_currency: String,
    pub countries_url: String,
    pub rates_url: String,
    pub summary_image_path: PathBuf,
    pub log_level: String,
    pub log_format: TraceFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .ok_or(ConfigError::MissingVariable { key: "DATABASE_URL" })?;

        let base_currency = get("BASE_CURRENCY")
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string())
            .trim()
            .to_ascii_uppercase();
        if base_currency.len() != 3 || !base_currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidVariable {
                key: "BASE_CURRENCY",
                value: base_currency,
                reason: "expected a three-letter currency code".to_string(),
            });
        }

        let database_pool_size = parsed(&get, "DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if database_pool_size == 0 {
            return Err(ConfigError::InvalidVariable {
                key: "DATABASE_POOL_SIZE",
                value: "0".to_string(),
                reason: "pool needs at least one connection".to_string(),
            });
        }

        Ok(Self {
            host: parsed(&get, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parsed(&get, "PORT", DEFAULT_PORT)?,
            database_url,
            database_pool_size,
            base_currency,
            countries_url: get("COUNTRIES_API_URL")
                .unwrap_or_else(|| DEFAULT_COUNTRIES_URL.to_string()),
            rates_url: get("RATES_API_URL").unwrap_or_else(|| DEFAULT_RATES_URL.to_string()),
            summary_image_path: get("SUMMARY_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUMMARY_IMAGE_PATH)),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: parsed(&get, "LOG_FORMAT", TraceFormat::default())?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parsed<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidVariable {
            key,
            reason: err.to_string(),
            value,
        }),
    }
}
