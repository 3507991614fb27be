use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::endpoints::{error_response, AppState};
use crate::services::{
    fetcher::CountrySource,
    refresh::{RefreshError, RefreshOutcome},
};
use crate::store::CountryStore;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Refresh: {source}")]
    Refresh {
        #[from]
        source: RefreshError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "refresh failed");
        match self {
            HandlerError::Refresh { source: RefreshError::Fetch { source } } => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "External data source unavailable",
                Some(source.to_string()),
            ),
            HandlerError::Refresh { source: RefreshError::Store { source } } => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(source.to_string()),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponseBody {
    pub message: &'static str,
    pub total_countries: usize,
    pub last_refreshed_at: DateTime<Utc>,
}

impl From<RefreshOutcome> for RefreshResponseBody {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            message: "Countries refreshed",
            total_countries: outcome.total_countries,
            last_refreshed_at: outcome.last_refreshed_at,
        }
    }
}

/// Axum handler: POST /countries/refresh
pub async fn handler<S: CountryStore, F: CountrySource>(
    Extension(state): Extension<AppState<S, F>>,
) -> Result<impl IntoResponse, HandlerError> {
    let outcome = state.refresh.run().await?;
    Ok((StatusCode::OK, Json(RefreshResponseBody::from(outcome))))
}
