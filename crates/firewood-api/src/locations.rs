//! HTTP client for the hosted PostgREST data API that stores firewood
//! locations and contact messages.
//!
//! Every request carries the anonymous key twice: as the `apikey` header and
//! as a bearer token. Reads and idempotent writes (`PATCH`, `DELETE`) are
//! retried on transient failures; inserts are sent once.

use firewood_core::{
    AppConfig, ContactMessage, LocationFilter, LocationId, LocationInput, LocationRecord,
    ReportOutcome,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{build_client, check_status, parse_base_url, read_json, DEFAULT_USER_AGENT};
use crate::retry::retry_with_backoff;

pub const DEFAULT_TABLE: &str = "firewood_locations";
pub const DEFAULT_REPORT_THRESHOLD: i64 = 20;

const CONTACTS_TABLE: &str = "contacts";

/// Client for the location table and the contacts table.
///
/// Use [`LocationsClient::new`] with loaded configuration, or
/// [`LocationsClient::with_base_url`] to point at a mock server in tests.
pub struct LocationsClient {
    client: Client,
    rest_url: Url,
    anon_key: String,
    table: String,
    report_threshold: i64,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Deserialize)]
struct ReportCountRow {
    #[serde(default)]
    report_count: Option<i64>,
}

impl LocationsClient {
    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if the configured
    /// URL is unusable.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = build_client(config.request_timeout_secs, &config.user_agent)?;
        Ok(Self::from_parts(
            client,
            parse_base_url(&config.supabase_url, "rest/v1")?,
            &config.supabase_anon_key,
        )
        .with_table(&config.table_name)
        .with_report_threshold(config.report_threshold)
        .with_retries(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Creates a client with default table, threshold and no retries.
    ///
    /// # Errors
    ///
    /// Same as [`LocationsClient::new`].
    pub fn with_base_url(
        base_url: &str,
        anon_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let client = build_client(timeout_secs, DEFAULT_USER_AGENT)?;
        Ok(Self::from_parts(
            client,
            parse_base_url(base_url, "rest/v1")?,
            anon_key,
        ))
    }

    fn from_parts(client: Client, rest_url: Url, anon_key: &str) -> Self {
        Self {
            client,
            rest_url,
            anon_key: anon_key.to_owned(),
            table: DEFAULT_TABLE.to_owned(),
            report_threshold: DEFAULT_REPORT_THRESHOLD,
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: &str) -> Self {
        table.clone_into(&mut self.table);
        self
    }

    #[must_use]
    pub fn with_report_threshold(mut self, threshold: i64) -> Self {
        self.report_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn report_threshold(&self) -> i64 {
        self.report_threshold
    }

    /// Fetches every location whose report count is below the threshold.
    ///
    /// `filter.search` becomes a case-insensitive name match on the server.
    /// `filter.wood_type` is not sent; callers apply it to the result.
    ///
    /// # Errors
    ///
    /// - [`ApiError::RateLimited`] / [`ApiError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ApiError::Http`] on network failure after all retries.
    /// - [`ApiError::Deserialize`] if the body is not a JSON array. Rows that
    ///   do not parse as a location are skipped.
    pub async fn fetch_locations(
        &self,
        filter: &LocationFilter,
    ) -> Result<Vec<LocationRecord>, ApiError> {
        let threshold = format!("lt.{}", self.report_threshold);
        let mut params = vec![("select", "*"), ("report_count", threshold.as_str())];
        let pattern;
        if let Some(search) = &filter.search {
            pattern = format!("ilike.*{search}*");
            params.push(("location_name", pattern.as_str()));
        }

        let url = self.table_url(&self.table, &params);
        let rows: Vec<serde_json::Value> = self.get_json(url, "location list").await?;

        let total = rows.len();
        let records: Vec<LocationRecord> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<LocationRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed location row");
                    None
                }
            })
            .collect();
        if records.len() < total {
            tracing::debug!(
                skipped = total - records.len(),
                "ignored location rows that did not parse"
            );
        }
        tracing::debug!(count = records.len(), search = ?filter.search, "fetched locations");
        Ok(records)
    }

    /// Fetches one location by id, regardless of its report count.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::LocationNotFound`] if no row has that id, plus the
    /// errors of [`LocationsClient::fetch_locations`].
    pub async fn fetch_location(&self, id: LocationId) -> Result<LocationRecord, ApiError> {
        let id_filter = format!("eq.{id}");
        let url = self.table_url(&self.table, &[("select", "*"), ("id", &id_filter)]);
        let rows: Vec<LocationRecord> = self.get_json(url, &format!("location {id}")).await?;
        rows.into_iter()
            .next()
            .ok_or(ApiError::LocationNotFound { id })
    }

    /// Inserts a new location.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedStatus`] if the insert is rejected, or
    /// [`ApiError::Http`] on network failure.
    pub async fn add_location(&self, input: &LocationInput) -> Result<(), ApiError> {
        let url = self.table_url(&self.table, &[]);
        self.write(Method::POST, url, Some(input)).await?;
        tracing::info!(name = %input.location_name, "location added");
        Ok(())
    }

    /// Overwrites the editable fields of a location.
    ///
    /// # Errors
    ///
    /// Same as [`LocationsClient::add_location`].
    pub async fn update_location(
        &self,
        id: LocationId,
        input: &LocationInput,
    ) -> Result<(), ApiError> {
        let url = self.id_url(id);
        self.write(Method::PATCH, url, Some(input)).await?;
        tracing::info!(id, "location updated");
        Ok(())
    }

    /// Deletes a location.
    ///
    /// # Errors
    ///
    /// Same as [`LocationsClient::add_location`].
    pub async fn delete_location(&self, id: LocationId) -> Result<(), ApiError> {
        let url = self.id_url(id);
        self.write::<()>(Method::DELETE, url, None).await?;
        tracing::info!(id, "location deleted");
        Ok(())
    }

    /// Adds one report to a location: reads the current count, then writes
    /// the incremented value back.
    ///
    /// The read and write are separate requests, so concurrent reports can
    /// overwrite each other's increment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::LocationNotFound`] if the row does not exist,
    /// plus the errors of the underlying read and write.
    pub async fn report_location(&self, id: LocationId) -> Result<ReportOutcome, ApiError> {
        let id_filter = format!("eq.{id}");
        let url = self.table_url(
            &self.table,
            &[("select", "report_count"), ("id", &id_filter)],
        );
        let rows: Vec<ReportCountRow> = self
            .get_json(url, &format!("report count of location {id}"))
            .await?;
        let previous = rows
            .first()
            .ok_or(ApiError::LocationNotFound { id })?
            .report_count
            .unwrap_or(0);

        let outcome = ReportOutcome::after_increment(id, previous, self.report_threshold);
        let body = serde_json::json!({ "report_count": outcome.report_count });
        self.write(Method::PATCH, self.id_url(id), Some(&body))
            .await?;

        tracing::info!(
            id,
            report_count = outcome.report_count,
            hidden = outcome.hidden,
            "location reported"
        );
        Ok(outcome)
    }

    /// Stores a contact-form message.
    ///
    /// # Errors
    ///
    /// Same as [`LocationsClient::add_location`].
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
        let url = self.table_url(CONTACTS_TABLE, &[]);
        self.write(Method::POST, url, Some(message)).await?;
        tracing::info!("contact message sent");
        Ok(())
    }

    /// `{rest_url}/{table}?{params}` with percent-encoded values.
    fn table_url(&self, table: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.rest_url.clone();
        // rest_url is validated as a base URL on construction
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(table);
        }
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    fn id_url(&self, id: LocationId) -> Url {
        self.table_url(&self.table, &[("id", &format!("eq.{id}"))])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn get_json<T>(&self, url: Url, context: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = self.request(Method::GET, url.clone());
            let url = url.to_string();
            async move {
                let response = check_status(request.send().await?, &url)?;
                read_json(response, context).await
            }
        })
        .await
    }

    async fn write<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let max_retries = if method == Method::POST {
            0
        } else {
            self.max_retries
        };
        retry_with_backoff(max_retries, self.backoff_base_ms, || {
            let mut request = self
                .request(method.clone(), url.clone())
                .header("Prefer", "return=minimal");
            if let Some(body) = body {
                request = request.json(body);
            }
            let url = url.to_string();
            async move {
                check_status(request.send().await?, &url)?;
                Ok(())
            }
        })
        .await
    }
}
