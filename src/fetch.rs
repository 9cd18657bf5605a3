// src/fetch.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::normalize::normalize;
use crate::record::{ContentRecord, Origin};

/// Request timeouts are clamped to this band regardless of configuration.
pub const MIN_TIMEOUT_SECS: u64 = 8;
pub const MAX_TIMEOUT_SECS: u64 = 20;

/// How an upstream wraps its record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Bare JSON array of records.
    #[default]
    Array,
    /// `{ "items": [...] }`
    Items,
    /// `{ "posts": [...] }`
    Posts,
}

/// One upstream content origin. Implementations must not let upstream
/// trouble escape: any failure degrades to an empty batch.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_records(&self) -> Vec<ContentRecord>;
    fn name(&self) -> &str;
    fn origin(&self) -> Origin;
}

/// HTTP fetcher for one configured origin (primary CMS proxy, secondary
/// proxy, raw tunnel — same code, different config).
pub struct HttpFetcher {
    name: String,
    base_url: String,
    origin: Origin,
    shape: ResponseShape,
    limit: usize,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(cfg: &SourceConfig) -> Result<Self> {
        let timeout = cfg.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .with_context(|| format!("building http client for source '{}'", cfg.name))?;
        Ok(Self {
            name: cfg.name.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            origin: cfg.origin,
            shape: cfg.shape,
            limit: cfg.limit,
            client,
        })
    }

    fn posts_url(&self) -> String {
        format!("{}/posts?limit={}", self.base_url, self.limit)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    /// Never fails. Network errors, timeouts, non-2xx statuses and parse
    /// failures all resolve to an empty batch, logged with their kind.
    async fn fetch_records(&self) -> Vec<ContentRecord> {
        let url = self.posts_url();

        let resp = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                let kind = if e.is_timeout() { "timeout" } else { "network" };
                tracing::warn!(error = ?e, source = %self.name, kind, "fetch failed");
                return Vec::new();
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), source = %self.name, kind = "http_status", "fetch failed");
            return Vec::new();
        }

        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, source = %self.name, kind = "network", "reading body failed");
                return Vec::new();
            }
        };

        let raws = match parse_batch(&body, self.shape) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, source = %self.name, kind = "parse", "response body unusable");
                return Vec::new();
            }
        };

        let total = raws.len();
        let records: Vec<ContentRecord> = raws
            .iter()
            .filter_map(|raw| normalize(raw, self.origin, &self.base_url))
            .collect();
        if records.len() < total {
            tracing::debug!(
                source = %self.name,
                dropped = total - records.len(),
                "records without identifiers skipped"
            );
        }
        records
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> Origin {
        self.origin
    }
}

/// Unwrap the configured response shape into the raw record list.
/// A body that is a bare array is accepted under any shape, since the
/// proxies occasionally drop their envelope.
pub fn parse_batch(body: &str, shape: ResponseShape) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(body).context("response is not valid json")?;

    let envelope_key = match shape {
        ResponseShape::Array => None,
        ResponseShape::Items => Some("items"),
        ResponseShape::Posts => Some("posts"),
    };

    match (value, envelope_key) {
        (Value::Array(items), _) => Ok(items),
        (Value::Object(mut map), Some(key)) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(anyhow!("'{key}' is {}, expected an array", type_name(&other))),
            None => Err(anyhow!("response object has no '{key}' field")),
        },
        (other, _) => Err(anyhow!("expected a record list, got {}", type_name(&other))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
