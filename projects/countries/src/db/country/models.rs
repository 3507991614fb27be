use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::countries;

/// A stored country row as served to clients. `name_key` stays internal.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = countries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Country {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// A row produced by the refresh pipeline, ready for upsert.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = countries)]
pub struct NewCountry {
    pub name_key: String,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Uniqueness key for a country name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl From<NewCountry> for Country {
    fn from(new: NewCountry) -> Self {
        Country {
            name: new.name,
            capital: new.capital,
            region: new.region,
            population: new.population,
            currency_code: new.currency_code,
            exchange_rate: new.exchange_rate,
            estimated_gdp: new.estimated_gdp,
            flag_url: new.flag_url,
            last_refreshed_at: new.last_refreshed_at,
        }
    }
}
