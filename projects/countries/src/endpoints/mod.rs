pub mod countries;

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{fetcher::CountrySource, refresh::RefreshPipeline};
use crate::store::CountryStore;

/// Shared handles threaded through every handler.
pub struct AppState<S, F> {
    pub store: Arc<S>,
    pub refresh: Arc<RefreshPipeline<S, F>>,
}

impl<S, F> Clone for AppState<S, F> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            refresh: Arc::clone(&self.refresh),
        }
    }
}

impl<S, F> AppState<S, F> {
    pub fn new(store: Arc<S>, refresh: RefreshPipeline<S, F>) -> Self {
        Self { store, refresh: Arc::new(refresh) }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = ErrorBody { error: error.to_string(), details };
    (status, Json(body)).into_response()
}

pub fn router<S, F>(state: AppState<S, F>) -> Router
where
    S: CountryStore,
    F: CountrySource,
{
    use countries::{image, list, read_by_name, refresh, status_info};

    Router::new()
        .route("/countries", get(list::index::handler::<S, F>))
        .route("/countries/refresh", post(refresh::index::handler::<S, F>))
        .route("/countries/status/info", get(status_info::index::handler::<S, F>))
        .route("/countries/image", get(image::index::handler::<S, F>))
        .route("/countries/{name}", get(read_by_name::index::handler::<S, F>))
        .route("/status", get(status_redirect))
        .fallback(not_found)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /status
async fn status_redirect() -> Redirect {
    Redirect::temporary("/countries/status/info")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}
