use reqwest::{Client, Response, StatusCode, Url};

use crate::core::config::ProviderConfig;
use crate::{MapError, Result};

/// Longest slice of an error body kept in a `MapError::Provider` message.
const MAX_ERROR_BODY: usize = 200;

/// Build the async client shared by one provider instance.
pub(crate) fn build_client(config: &ProviderConfig) -> Result<Client> {
    config.validate()?;
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .tcp_keepalive(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90));
    // Local mirrors and mock servers must not go through a system proxy.
    if is_loopback(&base_url(config)?) {
        builder = builder.no_proxy();
    }
    builder.build().map_err(MapError::Network)
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

pub(crate) fn base_url(config: &ProviderConfig) -> Result<Url> {
    Url::parse(&config.api_base_url)
        .map_err(|e| MapError::Config(format!("invalid api base url '{}': {}", config.api_base_url, e)))
}

/// Pass a successful response through, turn anything else into a
/// `MapError::Provider` carrying the status and the start of the body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> MapError {
    let body = body.trim();
    if body.is_empty() {
        MapError::Provider(format!("HTTP {}", status))
    } else {
        let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
        MapError::Provider(format!("HTTP {}: {}", status, snippet))
    }
}

/// URL with the credential stripped, for log lines.
pub(crate) fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
