//! Error types for the websift crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Transient retrieval failures are absorbed
//! inside the pipeline (they surface as empty result sets, see the crate
//! docs), so most of these variants only appear when calling the lower
//! level clients directly.

/// Errors that can occur during curation operations.
#[derive(Debug, thiserror::Error)]
pub enum CurateError {
    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A request to the search backend failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// A chat completion request failed or returned an unusable body.
    #[error("llm error: {0}")]
    Llm(String),

    /// The embedding model could not be loaded or could not encode.
    #[error("embedding error: {0}")]
    Embedding(String),
}

/// Convenience type alias for websift results.
pub type Result<T> = std::result::Result<T, CurateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = CurateError::Config("count must be > 0".into());
        assert_eq!(err.to_string(), "config error: count must be > 0");
    }

    #[test]
    fn display_backend() {
        let err = CurateError::Backend("connection refused".into());
        assert_eq!(err.to_string(), "backend error: connection refused");
    }

    #[test]
    fn display_llm() {
        let err = CurateError::Llm("empty choices array".into());
        assert_eq!(err.to_string(), "llm error: empty choices array");
    }

    #[test]
    fn display_embedding() {
        let err = CurateError::Embedding("tokenizer missing".into());
        assert_eq!(err.to_string(), "embedding error: tokenizer missing");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CurateError>();
    }
}
