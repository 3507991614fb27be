use reqwest::{Client, StatusCode};
use thiserror::Error;

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v3.1/all?fields=name,capital,region,population,flags,currencies";

pub struct RestCountriesResult {
    pub body: String,
    pub status: StatusCode,
}

pub async fn fetch_all_countries(
    client: &Client,
    url: &str,
) -> Result<RestCountriesResult, FetchAllCountriesError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .header("User-Agent", "rust-client")
        .send()
        .await
        .map_err(|source| FetchAllCountriesError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchAllCountriesError::ResponseRead { source })?;

    Ok(RestCountriesResult { body, status })
}

#[derive(Debug, Error)]
pub enum FetchAllCountriesError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
