//! Per-call pipeline configuration with sensible defaults.
//!
//! [`PipelineConfig`] carries the knobs a caller may tune for one curation
//! call: result count, backend time-range filter, timeout, dedup threshold,
//! and the per-domain diversity cap. Nothing here is persisted.

use crate::error::CurateError;

/// Time-range filter forwarded to the search backend.
///
/// Wrapped in an `Option` on [`PipelineConfig`]; `None` searches all time
/// and sends no filter parameter at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Returns the backend query-parameter token for this range.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Configuration for one curation call.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum number of curated results to return.
    pub count: usize,
    /// Time-range filter forwarded to the backend. `None` searches all time.
    pub time_range: Option<TimeRange>,
    /// Per-call search request timeout in seconds.
    pub timeout_seconds: u64,
    /// Similarity threshold override for the deduplicator. `None` uses the
    /// strategy default: 0.75 for embedding similarity, 0.6 for the lexical
    /// fallback.
    pub dedup_threshold: Option<f64>,
    /// Maximum results sharing one source domain.
    pub max_per_domain: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            count: 10,
            time_range: Some(TimeRange::Year),
            timeout_seconds: 15,
            dedup_threshold: None,
            max_per_domain: 2,
        }
    }
}

impl PipelineConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `count` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `dedup_threshold`, when set, must be within `(0.0, 1.0]`
    /// - `max_per_domain` must be greater than 0
    pub fn validate(&self) -> Result<(), CurateError> {
        if self.count == 0 {
            return Err(CurateError::Config("count must be greater than 0".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(CurateError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if let Some(threshold) = self.dedup_threshold {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(CurateError::Config(
                    "dedup_threshold must be within (0.0, 1.0]".into(),
                ));
            }
        }
        if self.max_per_domain == 0 {
            return Err(CurateError::Config(
                "max_per_domain must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
