use std::sync::Arc;

use projects_countries::{
    config::{AppConfig, ConfigError},
    db::{build_pool, BuildPoolError},
    endpoints::{router, AppState},
    services::{fetcher::HttpCountrySource, refresh::RefreshPipeline},
    store::{CountryStore, PgCountryStore, StoreError},
    utils::summary_image::SummaryImage,
};
use thiserror::Error;
use tracing::{info, warn};
use utils_trace::init as tracing_init;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("LoadConfig: {source}")]
    LoadConfig {
        #[source]
        source: ConfigError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("BuildPool: {source}")]
    BuildPool {
        #[source]
        source: BuildPoolError,
    },
    #[error("ProvisionSchema: {source}")]
    ProvisionSchema {
        #[source]
        source: StoreError,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let dotenv = dotenvy::dotenv();

    let config = AppConfig::from_env().map_err(|source| MainError::LoadConfig { source })?;

    tracing_init(&config.log_level, config.log_format)
        .map_err(|source| MainError::TracingInit { source })?;

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, ".env present but unreadable");
        }
    }

    let pool = build_pool(&config.database_url, config.database_pool_size)
        .map_err(|source| MainError::BuildPool { source })?;
    let store = Arc::new(PgCountryStore::new(pool));

    // Schema must exist before the first refresh can be accepted.
    store
        .provision()
        .await
        .map_err(|source| MainError::ProvisionSchema { source })?;
    info!("countries table ready");

    let source = Arc::new(HttpCountrySource::new(
        reqwest::Client::new(),
        config.countries_url.clone(),
        config.rates_url.clone(),
    ));

    let pipeline = RefreshPipeline::new(
        Arc::clone(&store),
        source,
        SummaryImage::new(config.summary_image_path.clone()),
        config.base_currency.clone(),
    );
    let app = router(AppState::new(store, pipeline));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| MainError::Serve { source })?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
