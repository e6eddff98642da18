//! SearXNG backend client.
//!
//! Issues JSON-format search requests against one SearXNG instance and
//! parses the raw record list. Failures are absorbed here: a timed-out,
//! refused, or malformed response is logged and yields an empty record set,
//! so callers proceed with less evidence instead of handling errors. The
//! client never retries; a liveness probe is exposed separately for callers
//! that want to report "search unavailable" up front.

use serde::Deserialize;

use crate::cache::{CacheKey, ResponseCache};
use crate::config::TimeRange;
use crate::error::{CurateError, Result};
use crate::http;
use crate::types::RawRecord;

/// Default TTL for the response cache in seconds.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;

/// Timeout for liveness probes in seconds.
const HEALTH_TIMEOUT_SECONDS: u64 = 5;

/// Raw candidates kept per requested result. The filtering stages discard
/// aggressively, so the client hands them several times the final count.
const RAW_HEADROOM: usize = 4;

/// Client for one SearXNG instance.
///
/// Cheap to clone; the response cache handle is shared between clones.
#[derive(Debug, Clone)]
pub struct SearxngClient {
    base_url: String,
    user_agent: Option<String>,
    cache: Option<ResponseCache>,
}

impl SearxngClient {
    /// Create a client for the instance at `base_url` (trailing slash
    /// tolerated) with the default response-cache TTL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: None,
            cache: Some(ResponseCache::new(DEFAULT_CACHE_TTL_SECONDS)),
        }
    }

    /// Replace the response-cache TTL. Zero disables caching entirely.
    pub fn with_cache_ttl(mut self, ttl_seconds: u64) -> Self {
        self.cache = (ttl_seconds > 0).then(|| ResponseCache::new(ttl_seconds));
        self
    }

    /// Use a fixed User-Agent instead of the rotating pool.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// The instance base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one search and return raw records.
    ///
    /// Fetches page 1 in JSON format with the given time-range filter and
    /// keeps at most `count` times the headroom factor records, bounding the
    /// deduplicator's quadratic work while leaving the filtering stages room
    /// to discard. Any failure (non-2xx, timeout, transport or parse error)
    /// is logged and returns an empty vector, never an error.
    pub async fn search(
        &self,
        query: &str,
        count: usize,
        time_range: Option<TimeRange>,
        timeout_seconds: u64,
    ) -> Vec<RawRecord> {
        let cache_key = CacheKey::new(query, time_range);
        let cap = count.saturating_mul(RAW_HEADROOM);

        if let Some(cache) = &self.cache {
            if let Some(mut records) = cache.get(&cache_key).await {
                tracing::trace!(query, records = records.len(), "response cache hit");
                records.truncate(cap);
                return records;
            }
        }

        tracing::debug!(query, ?time_range, "querying search backend");

        let mut records = match self.fetch(query, time_range, timeout_seconds).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(query, error = %err, "search failed, returning no records");
                return Vec::new();
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, records.clone()).await;
        }

        records.truncate(cap);
        tracing::debug!(query, records = records.len(), "raw records received");
        records
    }

    /// Check whether the instance is up and answering.
    ///
    /// Probes the dedicated `/healthz` endpoint first; when that endpoint is
    /// unreachable, falls back to a minimal real search request. A 2xx from
    /// either means healthy.
    pub async fn health_check(&self) -> bool {
        let Ok(client) = http::build_client(HEALTH_TIMEOUT_SECONDS, self.user_agent.as_deref())
        else {
            return false;
        };

        match client.get(format!("{}/healthz", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::trace!(error = %err, "healthz unreachable, probing with minimal search");
                match client
                    .get(format!("{}/search", self.base_url))
                    .query(&[("q", "test"), ("format", "json")])
                    .send()
                    .await
                {
                    Ok(response) => response.status().is_success(),
                    Err(_) => false,
                }
            }
        }
    }

    async fn fetch(
        &self,
        query: &str,
        time_range: Option<TimeRange>,
        timeout_seconds: u64,
    ) -> Result<Vec<RawRecord>> {
        let client = http::build_client(timeout_seconds, self.user_agent.as_deref())
            .map_err(|e| CurateError::Backend(format!("failed to build HTTP client: {e}")))?;

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("pageno", "1".to_string()),
        ];
        if let Some(range) = time_range {
            params.push(("time_range", range.as_param().to_string()));
        }

        let response = client
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| CurateError::Backend(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CurateError::Backend(format!("search returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CurateError::Backend(format!("response read failed: {e}")))?;

        parse_response(&body)
    }
}

/// Parse a SearXNG JSON response body into raw records.
///
/// Extracted as a separate function for testability with mock bodies.
pub(crate) fn parse_response(body: &str) -> Result<Vec<RawRecord>> {
    #[derive(Debug, Deserialize)]
    struct SearchResponse {
        #[serde(default)]
        results: Vec<RawRecord>,
    }

    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| CurateError::Backend(format!("malformed backend response: {e}")))?;
    Ok(response.results)
}
