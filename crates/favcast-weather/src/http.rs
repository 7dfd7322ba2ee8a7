//! Shared HTTP plumbing for the geocoding and weather endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::WeatherError;

/// Default timeout for every external call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const USER_AGENT: &str = concat!("favcast/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the resolver and the gateway.
pub fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherError::from_reqwest("client", e))
}

/// Issue a GET and decode the JSON body.
///
/// Transport failures, non-2xx statuses and undecodable bodies all come back
/// as `WeatherError::Upstream`. No retry.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    endpoint: &str,
) -> Result<T, WeatherError> {
    let response = client.get(url).query(query).send().await.map_err(|e| {
        let err = WeatherError::from_reqwest(endpoint, e);
        tracing::error!(endpoint, "API call failed: {}", err);
        err
    })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::error!(endpoint, status = status.as_u16(), "API call failed: {}", text);
        return Err(WeatherError::Upstream {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: format!("{}: {}", status, text),
        });
    }

    let body = response.json::<T>().await.map_err(|e| {
        tracing::error!(endpoint, "API response parse error: {}", e);
        WeatherError::upstream(endpoint, format!("JSON parse error: {}", e.without_url()))
    })?;

    tracing::debug!(endpoint, "API call successful");
    Ok(body)
}
