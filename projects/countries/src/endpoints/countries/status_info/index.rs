use axum::{
    extract::{Extension, Json},
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
    #[error("GetStatus: {source}")]
    GetStatus {
        #[from]
        source: query::QueryError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "reading status failed");
        let HandlerError::GetStatus { source } = self;
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(source.to_string()),
        )
    }
}

/// Axum handler: GET /countries/status/info
pub async fn handler<S: CountryStore, F: CountrySource>(
    Extension(state): Extension<AppState<S, F>>,
) -> Result<impl IntoResponse, HandlerError> {
    let status = query::get_status(state.store.as_ref()).await?;
    Ok((StatusCode::OK, Json(status)))
}
