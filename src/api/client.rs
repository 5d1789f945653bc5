// src/api/client.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::query::QueryParams;
use crate::utils::config::ApiConfig;

/// One upstream record, as returned in the `results` list.
pub type Record = Map<String, Value>;

/// Result of a single upstream query.
///
/// Transport errors, timeouts, non-success statuses and malformed bodies all
/// become `Failed`; callers treat it like an empty result and move on.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Records(Vec<Record>),
    Failed(String),
}

impl QueryOutcome {
    /// Records on success, an empty slice on failure.
    pub fn records(&self) -> &[Record] {
        match self {
            QueryOutcome::Records(records) => records,
            QueryOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

/// Anything that can answer a `records` query against a named dataset partition.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn query(&self, dataset: &str, params: &QueryParams) -> QueryOutcome;
}

#[derive(Deserialize)]
struct RecordsEnvelope {
    #[serde(default)]
    results: Option<Vec<Record>>,
}

/// Parse a response body. A missing `results` key means "no match".
pub fn parse_records_body(body: &str) -> QueryOutcome {
    match serde_json::from_str::<RecordsEnvelope>(body) {
        Ok(envelope) => QueryOutcome::Records(envelope.results.unwrap_or_default()),
        Err(e) => QueryOutcome::Failed(format!("malformed response: {}", e)),
    }
}

/// `RecordSource` over the Opendatasoft Explore v2.1 HTTP API.
pub struct HttpRecordSource {
    client: Client,
    config: ApiConfig,
}

impl HttpRecordSource {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn query(&self, dataset: &str, params: &QueryParams) -> QueryOutcome {
        let url = self.config.records_url(dataset);
        debug!("GET {} where={}", url, params.where_clause);

        let response = match self.client.get(&url).query(&params.as_pairs()).send().await {
            Ok(response) => response,
            Err(e) => return QueryOutcome::Failed(format!("request failed: {}", e)),
        };
        if !response.status().is_success() {
            return QueryOutcome::Failed(format!("upstream returned status {}", response.status()));
        }
        match response.text().await {
            Ok(body) => parse_records_body(&body),
            Err(e) => QueryOutcome::Failed(format!("failed to read body: {}", e)),
        }
    }
}

/// Numeric field of a record. The API serves most amounts as JSON numbers but
/// some fields (notably `an`) as strings.
pub fn field_f64(record: &Record, key: &str) -> Option<f64> {
    let value = match record.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

pub fn field_str<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}
