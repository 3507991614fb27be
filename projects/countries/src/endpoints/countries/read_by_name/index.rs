use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;
use tracing::error;

use crate::endpoints::{error_response, AppState};
use crate::services::{fetcher::CountrySource, query};
use crate::store::CountryStore;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("CountryNotFound: {name}")]
    CountryNotFound { name: String },
    #[error("GetCountryByName: {source}")]
    GetCountryByName { source: query::QueryError },
}

impl From<query::QueryError> for HandlerError {
    fn from(err: query::QueryError) -> Self {
        match err {
            query::QueryError::CountryNotFound { name } => HandlerError::CountryNotFound { name },
            source => HandlerError::GetCountryByName { source },
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::CountryNotFound { .. } => {
                error_response(StatusCode::NOT_FOUND, "Country not found", None)
            }
            HandlerError::GetCountryByName { source } => {
                error!(error = %source, "reading country failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(source.to_string()),
                )
            }
        }
    }
}

/// Axum handler: GET /countries/{name}
pub async fn handler<S: CountryStore, F: CountrySource>(
    Extension(state): Extension<AppState<S, F>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let country = query::get_country_by_name(state.store.as_ref(), &name).await?;
    Ok((StatusCode::OK, Json(country)))
}
