use chrono::{DateTime, Utc};
use diesel::{
    dsl::{count_star, max, sql},
    expression::SqlLiteral,
    prelude::*,
    sql_types::{Bool, Text},
    upsert::excluded,
};
use thiserror::Error;

use crate::db::{
    country::models::{self, Country, NewCountry},
    schema::countries::dsl::*,
};
use crate::store::{CountryFilter, CountrySort};

// Ten bind parameters per row; Postgres caps a statement at 65535.
const UPSERT_CHUNK_ROWS: usize = 1000;

/// `name` under the byte-order collation, so ties and listings sort the same
/// way as `str::cmp` regardless of the database locale.
fn name_bytewise() -> SqlLiteral<Text> {
    sql::<Text>(r#"name COLLATE "C""#)
}

#[derive(Debug, Error)]
pub enum UpsertCountriesError {
    #[error("UpsertCountries: {source}")]
    UpsertCountries {
        #[from]
        source: diesel::result::Error,
    },
}

/// Inserts new keys and overwrites every non-key column of existing ones.
/// The whole batch commits or rolls back together.
pub fn upsert_countries(
    conn: &mut PgConnection,
    rows: &[NewCountry],
) -> Result<usize, UpsertCountriesError> {
    if rows.is_empty() {
        return Ok(0);
    }

    conn.transaction(|conn| {
        let mut affected = 0;
        for chunk in rows.chunks(UPSERT_CHUNK_ROWS) {
            affected += diesel::insert_into(countries)
                .values(chunk)
                .on_conflict(name_key)
                .do_update()
                .set((
                    name.eq(excluded(name)),
                    capital.eq(excluded(capital)),
                    region.eq(excluded(region)),
                    population.eq(excluded(population)),
                    currency_code.eq(excluded(currency_code)),
                    exchange_rate.eq(excluded(exchange_rate)),
                    estimated_gdp.eq(excluded(estimated_gdp)),
                    flag_url.eq(excluded(flag_url)),
                    last_refreshed_at.eq(excluded(last_refreshed_at)),
                ))
                .execute(conn)?;
        }
        Ok::<_, diesel::result::Error>(affected)
    })
    .map_err(|source| UpsertCountriesError::UpsertCountries { source })
}

#[derive(Debug, Error)]
pub enum ListCountriesError {
    #[error("ListCountries: {source}")]
    ListCountries {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn list_countries(
    conn: &mut PgConnection,
    filter: &CountryFilter,
    sort: Option<CountrySort>,
) -> Result<Vec<Country>, ListCountriesError> {
    let mut query = countries.select(Country::as_select()).into_boxed();

    if let Some(region_val) = filter.region.clone() {
        query = query.filter(
            sql::<Bool>("lower(region) = lower(")
                .bind::<Text, _>(region_val)
                .sql(")"),
        );
    }
    if let Some(currency_val) = filter.currency.clone() {
        query = query.filter(
            sql::<Bool>("lower(currency_code) = lower(")
                .bind::<Text, _>(currency_val)
                .sql(")"),
        );
    }

    query = match sort {
        None => query.order(name_bytewise().asc()),
        Some(CountrySort::Population) => query.order((population.desc(), name_bytewise().asc())),
        Some(CountrySort::Gdp) => {
            query.order((estimated_gdp.desc().nulls_last(), name_bytewise().asc()))
        }
    };

    query
        .load(conn)
        .map_err(|source| ListCountriesError::ListCountries { source })
}

#[derive(Debug, Error)]
pub enum GetCountryByNameError {
    #[error("GetCountryByName: {source}")]
    GetCountryByName {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn get_country_by_name(
    conn: &mut PgConnection,
    name_val: &str,
) -> Result<Option<Country>, GetCountryByNameError> {
    countries
        .filter(name_key.eq(models::name_key(name_val)))
        .select(Country::as_select())
        .first(conn)
        .optional()
        .map_err(|source| GetCountryByNameError::GetCountryByName { source })
}

#[derive(Debug, Error)]
pub enum GetCountryStatusError {
    #[error("GetCountryStatus: {source}")]
    GetCountryStatus {
        #[from]
        source: diesel::result::Error,
    },
}

/// Row count and newest `last_refreshed_at` in one round trip.
pub fn get_country_status(
    conn: &mut PgConnection,
) -> Result<(i64, Option<DateTime<Utc>>), GetCountryStatusError> {
    countries
        .select((count_star(), max(last_refreshed_at)))
        .get_result::<(i64, Option<DateTime<Utc>>)>(conn)
        .map_err(|source| GetCountryStatusError::GetCountryStatus { source })
}

#[derive(Debug, Error)]
pub enum GetTopCountriesByGdpError {
    #[error("GetTopCountriesByGdp: {source}")]
    GetTopCountriesByGdp {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn get_top_countries_by_gdp(
    conn: &mut PgConnection,
    limit: i64,
) -> Result<Vec<Country>, GetTopCountriesByGdpError> {
    countries
        .filter(estimated_gdp.is_not_null())
        .order((estimated_gdp.desc(), name_bytewise().asc()))
        .limit(limit)
        .select(Country::as_select())
        .load(conn)
        .map_err(|source| GetTopCountriesByGdpError::GetTopCountriesByGdp { source })
}
