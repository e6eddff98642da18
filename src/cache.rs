//! In-memory TTL cache for raw backend responses.
//!
//! Caches the parsed (but not yet normalised) record list keyed by the
//! (lowercased query, time-range) pair, so a repeated query within the TTL
//! skips the outbound call entirely. Uses [`moka`] for async-friendly
//! caching with automatic eviction.
//!
//! The cache is owned by the retrieval client that created it, not a
//! process-wide global, so its TTL and lifetime follow the client.

use std::fmt;
use std::time::Duration;

use moka::future::Cache;

use crate::config::TimeRange;
use crate::types::RawRecord;

/// Maximum number of cached response record sets.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Composite cache key: normalised query + time-range filter.
///
/// The time range is part of the key because the backend returns different
/// result pages for different `time_range` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    /// Time-range filter sent with the query, `None` for unfiltered.
    time_range: Option<TimeRange>,
}

impl CacheKey {
    /// Build a deterministic cache key from a query and time-range filter.
    pub fn new(query: &str, time_range: Option<TimeRange>) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            time_range,
        }
    }
}

/// TTL-bounded cache of parsed per-query backend responses.
///
/// Entries expire a fixed interval after insertion. Callers that want no
/// caching simply do not construct one; a zero TTL is not representable.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<CacheKey, Vec<RawRecord>>,
}

impl ResponseCache {
    /// Create a cache whose entries expire `ttl_seconds` after insertion.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build(),
        }
    }

    /// Look up cached records for the given key.
    ///
    /// Returns `Some(records)` on cache hit, `None` on miss or expiry.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<RawRecord>> {
        self.inner.get(key).await
    }

    /// Insert parsed records for the given key.
    pub async fn insert(&self, key: CacheKey, records: Vec<RawRecord>) {
        self.inner.insert(key, records).await;
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache").finish_non_exhaustive()
    }
}
