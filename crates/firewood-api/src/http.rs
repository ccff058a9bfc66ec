//! Plumbing shared by the two clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub(crate) const DEFAULT_USER_AGENT: &str = "FirewoodMapApp/1.0";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ApiError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `base_url` and appends `suffix`, leaving exactly one slash between
/// them and a trailing slash at the end.
pub(crate) fn parse_base_url(base_url: &str, suffix: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        suffix.trim_matches('/')
    );
    let normalised = format!("{}/", joined.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http or https URL".to_owned()));
    }
    Ok(url)
}

/// Maps non-2xx responses onto typed errors.
pub(crate) fn check_status(response: Response, url: &str) -> Result<Response, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(ApiError::RateLimited {
            url: url.to_owned(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}

pub(crate) async fn read_json<T>(response: Response, context: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
