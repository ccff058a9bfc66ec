//! Free-text address search against a Nominatim instance.

use firewood_core::{AddressCandidate, AppConfig, Coordinates};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{build_client, check_status, parse_base_url, read_json, DEFAULT_USER_AGENT};
use crate::retry::retry_with_backoff;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
}

impl Place {
    fn into_candidate(self) -> Option<AddressCandidate> {
        let latitude = self.lat.trim().parse::<f64>().ok()?;
        let longitude = self.lon.trim().parse::<f64>().ok()?;
        Some(AddressCandidate {
            position: Coordinates::new(latitude, longitude)?,
            display_name: self.display_name,
        })
    }
}

pub struct NominatimClient {
    client: Client,
    search_url: Url,
    country_codes: String,
    limit: u32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl NominatimClient {
    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if the configured
    /// URL is unusable.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = build_client(config.request_timeout_secs, &config.user_agent)?;
        Ok(Self {
            client,
            search_url: search_url(&config.nominatim_url)?,
            country_codes: config.nominatim_country_codes.clone(),
            limit: config.nominatim_limit,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Creates a client restricted to Japan with five results and no retries.
    ///
    /// # Errors
    ///
    /// Same as [`NominatimClient::new`].
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(timeout_secs, DEFAULT_USER_AGENT)?,
            search_url: search_url(base_url)?,
            country_codes: "jp".to_owned(),
            limit: 5,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Searches for `query` and returns the hits that carry usable
    /// coordinates, in the order the service ranked them.
    ///
    /// # Errors
    ///
    /// - [`ApiError::EmptyQuery`] if `query` is blank; no request is sent.
    /// - [`ApiError::RateLimited`] / [`ApiError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Deserialize`] if the body is not a JSON array.
    pub async fn search(&self, query: &str) -> Result<Vec<AddressCandidate>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::EmptyQuery);
        }

        let url = self.build_url(query);
        let raw: Vec<serde_json::Value> =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                let request = self.client.get(url.clone());
                let url = url.to_string();
                async move {
                    let response = check_status(request.send().await?, &url)?;
                    read_json(response, "address search").await
                }
            })
            .await?;

        let total = raw.len();
        let candidates: Vec<AddressCandidate> = raw
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Place>(v).ok())
            .filter_map(Place::into_candidate)
            .collect();
        if candidates.len() < total {
            tracing::debug!(
                skipped = total - candidates.len(),
                "ignored geocoder hits without usable coordinates"
            );
        }
        Ok(candidates)
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("q", query);
            if !self.country_codes.is_empty() {
                pairs.append_pair("countrycodes", &self.country_codes);
            }
            pairs.append_pair("limit", &self.limit.to_string());
        }
        url
    }
}

fn search_url(base_url: &str) -> Result<Url, ApiError> {
    let base = parse_base_url(base_url, "")?;
    base.join("search").map_err(|e| ApiError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}
