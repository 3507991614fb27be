use reqwest::{Client, StatusCode};
use thiserror::Error;

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest";

pub struct LatestRatesResult {
    pub body: String,
    pub status: StatusCode,
}

/// GET `{base_url}/{base}`, e.g. `https://open.er-api.com/v6/latest/USD`.
pub async fn fetch_latest_rates(
    client: &Client,
    base_url: &str,
    base: &str,
) -> Result<LatestRatesResult, FetchLatestRatesError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), base);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .header("User-Agent", "rust-client")
        .send()
        .await
        .map_err(|source| FetchLatestRatesError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchLatestRatesError::ResponseRead { source })?;

    Ok(LatestRatesResult { body, status })
}

#[derive(Debug, Error)]
pub enum FetchLatestRatesError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
