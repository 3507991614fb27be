use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

use crate::endpoints::{error_response, AppState};
use crate::services::{fetcher::CountrySource, query};
use crate::store::{CountryFilter, CountrySort, CountryStore, UnknownCountrySort};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("InvalidSort: {source}")]
    InvalidSort {
        #[from]
        source: UnknownCountrySort,
    },
    #[error("ListCountries: {source}")]
    ListCountries {
        #[from]
        source: query::QueryError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidSort { source } => {
                error_response(StatusCode::BAD_REQUEST, "Invalid sort", Some(source.to_string()))
            }
            HandlerError::ListCountries { source } => {
                error!(error = %source, "listing countries failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(source.to_string()),
                )
            }
        }
    }
}

/// Query parameters for the endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListCountriesParams {
    region: Option<String>,
    currency: Option<String>,
    sort: Option<String>,
}

/// Axum handler: GET /countries
///
/// An empty match is `200 []`, not a 404.
pub async fn handler<S: CountryStore, F: CountrySource>(
    Extension(state): Extension<AppState<S, F>>,
    Query(params): Query<ListCountriesParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let sort = params
        .sort
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<CountrySort>)
        .transpose()?;

    let filter = CountryFilter {
        region: params.region,
        currency: params.currency,
    };

    let countries = query::list_countries(state.store.as_ref(), filter, sort).await?;
    Ok((StatusCode::OK, Json(countries)))
}
