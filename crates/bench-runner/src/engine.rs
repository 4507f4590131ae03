//! The search engine seam and its Solr implementation.

use crate::error::RunnerError;
use async_trait::async_trait;
use bench_core::Document;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default HTTP timeout for engine requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Server-reported time an engine request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub qtime_ms: u64,
}

impl Timing {
    pub fn secs(&self) -> f64 {
        self.qtime_ms as f64 * 0.001
    }
}

/// Outcome of one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub hits: u64,
    pub qtime_ms: u64,
}

/// Extra query parameters, in order. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Facet on each of `fields` without returning any documents.
    pub fn facets<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = Self::new().with("rows", "0").with("facet", "true");
        for field in fields {
            params.push("facet.field", field);
        }
        params
    }
}

/// A search engine the runner can index into and query.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Send documents without committing.
    async fn add(&self, docs: &[Document]) -> Result<Timing, RunnerError>;

    /// Make added documents searchable.
    async fn commit(&self) -> Result<Timing, RunnerError>;

    /// Run one query.
    async fn search(&self, query: &str, params: &QueryParams) -> Result<SearchResult, RunnerError>;
}

// ============================================================================
// Solr
// ============================================================================

/// Solr collection client over the JSON update and select handlers.
pub struct SolrClient {
    client: Client,
    base_url: String,
}

impl SolrClient {
    /// Client for the collection at `base_url`, e.g.
    /// `http://localhost:8983/solr/bench`.
    pub fn new(base_url: &str) -> Result<Self, RunnerError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, RunnerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn update_url(&self) -> String {
        format!("{}/update", self.base_url)
    }

    fn select_url(&self) -> String {
        format!("{}/select", self.base_url)
    }

    async fn update(&self, body: Value, commit: bool) -> Result<Timing, RunnerError> {
        let response = self
            .client
            .post(self.update_url())
            .query(&[("commit", commit.to_string()), ("wt", "json".to_string())])
            .json(&body)
            .send()
            .await?;
        let body = read_body(response).await?;
        Ok(Timing {
            qtime_ms: parse_qtime(&body)?,
        })
    }
}

#[async_trait]
impl SearchEngine for SolrClient {
    async fn add(&self, docs: &[Document]) -> Result<Timing, RunnerError> {
        debug!("Adding {} docs to {}", docs.len(), self.base_url);
        self.update(serde_json::to_value(docs)?, false).await
    }

    async fn commit(&self) -> Result<Timing, RunnerError> {
        debug!("Committing {}", self.base_url);
        self.update(json!({ "commit": {} }), true).await
    }

    async fn search(&self, query: &str, params: &QueryParams) -> Result<SearchResult, RunnerError> {
        let response = self
            .client
            .get(self.select_url())
            .query(&[("q", query), ("wt", "json")])
            .query(params.pairs())
            .send()
            .await?;
        let body = read_body(response).await?;
        Ok(SearchResult {
            hits: parse_num_found(&body)?,
            qtime_ms: parse_qtime(&body)?,
        })
    }
}

async fn read_body(response: Response) -> Result<Value, RunnerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.pointer("/error/msg").and_then(Value::as_str).map(String::from))
        .unwrap_or(text);
    Err(RunnerError::Engine {
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn parse_qtime(body: &Value) -> Result<u64, RunnerError> {
    body.pointer("/responseHeader/QTime")
        .and_then(Value::as_u64)
        .ok_or(RunnerError::MissingField("responseHeader.QTime"))
}

pub(crate) fn parse_num_found(body: &Value) -> Result<u64, RunnerError> {
    body.pointer("/response/numFound")
        .and_then(Value::as_u64)
        .ok_or(RunnerError::MissingField("response.numFound"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_response() {
        let body = json!({
            "responseHeader": { "status": 0, "QTime": 17 },
            "response": { "numFound": 1234, "start": 0, "docs": [] }
        });
        assert_eq!(parse_qtime(&body).unwrap(), 17);
        assert_eq!(parse_num_found(&body).unwrap(), 1234);
    }

    #[test]
    fn test_parse_missing_fields() {
        let body = json!({ "responseHeader": { "status": 0 } });
        assert!(matches!(
            parse_qtime(&body),
            Err(RunnerError::MissingField("responseHeader.QTime"))
        ));
        assert!(matches!(
            parse_num_found(&body),
            Err(RunnerError::MissingField("response.numFound"))
        ));
    }

    #[test]
    fn test_timing_secs() {
        assert_eq!(Timing { qtime_ms: 1500 }.secs(), 1.5);
        assert_eq!(Timing::default().secs(), 0.0);
    }

    #[test]
    fn test_facet_params() {
        let params = QueryParams::facets(["color", "tags"]);
        assert_eq!(
            params.pairs(),
            &[
                ("rows".to_string(), "0".to_string()),
                ("facet".to_string(), "true".to_string()),
                ("facet.field".to_string(), "color".to_string()),
                ("facet.field".to_string(), "tags".to_string()),
            ]
        );
    }

    #[test]
    fn test_client_urls() {
        let client = SolrClient::new("http://localhost:8983/solr/bench/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8983/solr/bench");
        assert_eq!(client.update_url(), "http://localhost:8983/solr/bench/update");
        assert_eq!(client.select_url(), "http://localhost:8983/solr/bench/select");
    }
}
