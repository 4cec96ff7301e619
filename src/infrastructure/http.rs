// Shared reqwest client construction and error mapping
use crate::error::AnalysisError;
use crate::infrastructure::config::HttpSettings;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client with the configured timeout applied to every request.
pub fn build_client(settings: &HttpSettings) -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(settings.timeout)
        .build()?;
    Ok(client)
}

/// Map a reqwest failure to a timeout, a malformed request or a remote fetch error.
pub fn request_error(url: &str, timeout: Duration, err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else if err.is_builder() {
        // Bad URL or header from configuration; sending again cannot help
        AnalysisError::InvalidRequest {
            url: url.to_string(),
            reason: err.to_string(),
        }
    } else {
        AnalysisError::RemoteFetch {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }
}

/// Turn a non-success response into a remote fetch error carrying the body.
pub async fn ensure_success(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AnalysisError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AnalysisError::RemoteFetch {
        url: url.to_string(),
        status: Some(status.as_u16()),
        reason: format!("status {}: {}", status, body.trim()),
    })
}
