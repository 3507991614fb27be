use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
};
use thiserror::Error;
use tracing::error;

use crate::endpoints::{error_response, AppState};
use crate::services::fetcher::CountrySource;
use crate::store::CountryStore;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("SummaryImageNotFound")]
    SummaryImageNotFound,
    #[error("ReadSummaryImage: {source}")]
    ReadSummaryImage {
        #[from]
        source: std::io::Error,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::SummaryImageNotFound => {
                error_response(StatusCode::NOT_FOUND, "Summary image not found", None)
            }
            HandlerError::ReadSummaryImage { source } => {
                error!(error = %source, "reading summary image failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(source.to_string()),
                )
            }
        }
    }
}

/// Axum handler: GET /countries/image
pub async fn handler<S: CountryStore, F: CountrySource>(
    Extension(state): Extension<AppState<S, F>>,
) -> Result<impl IntoResponse, HandlerError> {
    let bytes = state
        .refresh
        .summary()
        .read()
        .await?
        .ok_or(HandlerError::SummaryImageNotFound)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        bytes,
    ))
}
