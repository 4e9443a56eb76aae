//! Airtable REST API table.
//!
//! Talks to `https://api.airtable.com/v0/{base}/{table}` with a bearer API
//! key. Writes are sent in batches of at most ten rows, the limit Airtable
//! enforces per request.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::formula;
use crate::table::{Fields, Row, RowId, RowUpdate, SelectQuery, Table};

/// Maximum rows per write request.
const MAX_BATCH: usize = 10;

/// Maximum rows per page of a list request.
const MAX_PAGE_SIZE: usize = 100;

/// Connection settings for an Airtable table.
#[derive(Clone, Deserialize)]
pub struct AirtableConfig {
    /// Personal access token or API key.
    pub api_key: String,
    /// Base identifier (`app...`).
    pub base_id: String,
    /// Table name or identifier.
    #[serde(default = "AirtableConfig::default_table")]
    pub table: String,
    /// API root, without a trailing base or table.
    #[serde(default = "AirtableConfig::default_api_url")]
    pub api_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "AirtableConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl AirtableConfig {
    /// Create a configuration with default table, URL and timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            table: Self::default_table(),
            api_url: Self::default_api_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }

    /// Default table name.
    #[must_use]
    pub fn default_table() -> String {
        "questions_answers".to_string()
    }

    /// Default API root.
    #[must_use]
    pub fn default_api_url() -> String {
        "https://api.airtable.com/v0".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("api_url", &self.api_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// A table reached through the Airtable REST API.
#[derive(Clone)]
pub struct AirtableTable {
    client: reqwest::Client,
    url: Url,
    api_key: String,
}

impl AirtableTable {
    /// Create a client for the configured table.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the API URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &AirtableConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| StoreError::Config(format!("failed to create HTTP client: {e}")))?;
        Self::with_client(client, config)
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the API URL is invalid.
    pub fn with_client(client: reqwest::Client, config: &AirtableConfig) -> Result<Self> {
        let mut url = Url::parse(&config.api_url)
            .map_err(|e| StoreError::Config(format!("invalid Airtable URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Config("Airtable URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&config.base_id)
            .push(&config.table);

        Ok(Self {
            client,
            url,
            api_key: config.api_key.clone(),
        })
    }

    /// The table endpoint requests are sent to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request(&self, method: reqwest::Method) -> RequestBuilder {
        self.client
            .request(method, self.url.clone())
            .bearer_auth(&self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Airtable request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| StoreError::Malformed(format!("invalid Airtable response: {e}")));
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| error_message(&body))
            .unwrap_or_else(|| format!("Airtable returned status {status}"));

        tracing::error!(status = %status, error = %message, "Airtable request failed");

        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Query-string parameters for a list request, minus pagination.
fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(filter) = &query.filter {
        params.push(("filterByFormula".to_string(), formula::compile(filter)));
    }
    for (i, sort) in query.sort.iter().enumerate() {
        params.push((format!("sort[{i}][field]"), sort.field.clone()));
        params.push((
            format!("sort[{i}][direction]"),
            sort.direction.as_str().to_string(),
        ));
    }
    for field in &query.fields {
        params.push(("fields[]".to_string(), field.clone()));
    }
    let page_size = query.max_records.map_or(MAX_PAGE_SIZE, |max| max.clamp(1, MAX_PAGE_SIZE));
    params.push(("pageSize".to_string(), page_size.to_string()));
    if let Some(max) = query.max_records {
        params.push(("maxRecords".to_string(), max.to_string()));
    }

    params
}

/// Extract a readable message from an Airtable error body.
///
/// Airtable reports errors either as `{"error": "NOT_FOUND"}` or as
/// `{"error": {"type": "...", "message": "..."}}`.
fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(kind) => Some(kind.clone()),
        Value::Object(error) => {
            let kind = error.get("type").and_then(Value::as_str);
            let message = error.get("message").and_then(Value::as_str);
            match (kind, message) {
                (Some(kind), Some(message)) => Some(format!("{kind}: {message}")),
                (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
                (None, None) => None,
            }
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    #[serde(default)]
    created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    fields: Fields,
}

impl From<RawRecord> for Row {
    fn from(raw: RawRecord) -> Self {
        Self {
            id: RowId::new(raw.id),
            created_time: raw.created_time,
            fields: raw.fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<RawRecord>,
}

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    fields: &'a Fields,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    records: Vec<UpdateItem<'a>>,
}

#[derive(Debug, Serialize)]
struct UpdateItem<'a> {
    id: &'a str,
    fields: &'a Fields,
}

#[async_trait]
impl Table for AirtableTable {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        let params = select_params(query);
        tracing::debug!(
            url = %self.url,
            filter = ?query.filter.as_ref().map(formula::compile),
            "Selecting Airtable rows"
        );

        let mut rows = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut request = self.request(reqwest::Method::GET).query(&params);
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset)]);
            }

            let page: ListResponse = self.send(request).await?;
            rows.extend(page.records.into_iter().map(Row::from));

            let limit_reached = query.max_records.is_some_and(|max| rows.len() >= max);
            match page.offset {
                Some(next) if !limit_reached => offset = Some(next),
                _ => break,
            }
        }

        if let Some(max) = query.max_records {
            rows.truncate(max);
        }
        Ok(rows)
    }

    async fn create(&self, fields: Fields) -> Result<Row> {
        let request = self
            .request(reqwest::Method::POST)
            .json(&CreateBody { fields: &fields });
        let raw: RawRecord = self.send(request).await?;

        tracing::debug!(row_id = %raw.id, "Created Airtable row");
        Ok(raw.into())
    }

    async fn update(&self, updates: Vec<RowUpdate>) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(updates.len());
        for batch in updates.chunks(MAX_BATCH) {
            let body = UpdateBody {
                records: batch
                    .iter()
                    .map(|u| UpdateItem {
                        id: u.id.as_str(),
                        fields: &u.fields,
                    })
                    .collect(),
            };
            let response: RecordsResponse = self
                .send(self.request(reqwest::Method::PATCH).json(&body))
                .await?;
            rows.extend(response.records.into_iter().map(Row::from));
        }

        tracing::debug!(count = rows.len(), "Updated Airtable rows");
        Ok(rows)
    }

    async fn destroy(&self, ids: &[RowId]) -> Result<()> {
        for batch in ids.chunks(MAX_BATCH) {
            let params: Vec<(&str, &str)> = batch.iter().map(|id| ("records[]", id.as_str())).collect();
            let _: Value = self
                .send(self.request(reqwest::Method::DELETE).query(&params))
                .await?;
        }

        tracing::debug!(count = ids.len(), "Deleted Airtable rows");
        Ok(())
    }
}
