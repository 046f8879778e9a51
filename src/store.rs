//! Row fetching from the hosted database.
//!
//! The pipeline only needs one read shape: every row of a table, a fixed set
//! of columns, ordered by creation time.  [`RowStore`] captures that seam so
//! tests can substitute an in-memory store; [`RestRowStore`] talks to a
//! PostgREST-compatible endpoint.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::ReportConfig;
use crate::model::{ReportKind, ReportRecords};

/// Failures surfaced by the row store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row query failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected row shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid store header: {0}")]
    Header(String),
}

/// A full-table read ordered by a single column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowQuery {
    pub table: &'static str,
    pub fields: &'static [&'static str],
    pub order_by: &'static str,
    pub ascending: bool,
}

impl RowQuery {
    /// The query issued for a report kind: all rows, oldest first.
    pub fn for_kind(kind: ReportKind) -> Self {
        Self {
            table: kind.table(),
            fields: kind.fields(),
            order_by: "created_at",
            ascending: true,
        }
    }

    /// Query string parameters in PostgREST syntax.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let direction = if self.ascending { "asc" } else { "desc" };
        vec![
            ("select", self.fields.join(",")),
            ("order", format!("{}.{}", self.order_by, direction)),
        ]
    }
}

/// Read-only access to an external tabular source.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Returns the raw rows matching `query` in the requested order.
    async fn select(&self, query: &RowQuery) -> Result<Vec<Value>, StoreError>;
}

/// Fetches and decodes every record of `kind`, oldest first.
///
/// An empty table yields an empty [`ReportRecords`]; deciding what that means
/// is left to the caller.
pub async fn fetch_records(
    store: &dyn RowStore,
    kind: ReportKind,
) -> Result<ReportRecords, StoreError> {
    let rows = store.select(&RowQuery::for_kind(kind)).await?;
    debug!("fetched {} {} rows", rows.len(), kind);

    Ok(match kind {
        ReportKind::Wellness => ReportRecords::Wellness(decode_rows(rows)?),
        ReportKind::Trust => ReportRecords::Trust(decode_rows(rows)?),
    })
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

/// [`RowStore`] backed by the database's REST interface.
#[derive(Clone, Debug)]
pub struct RestRowStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestRowStore {
    /// Builds a client that authenticates every request with the configured key.
    pub fn new(config: &ReportConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.store_key)
            .map_err(|err| StoreError::Header(err.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.store_key))
            .map_err(|err| StoreError::Header(err.to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.store_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Endpoint serving rows of `table`.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl RowStore for RestRowStore {
    async fn select(&self, query: &RowQuery) -> Result<Vec<Value>, StoreError> {
        let response = self
            .client
            .get(self.table_url(query.table))
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: rejection_message(status, &body),
            });
        }

        Ok(response.json::<Vec<Value>>().await?)
    }
}

/// Prefers the `message` field of a PostgREST error body over the bare status.
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| format!("row store responded with {}", status))
}
