//! # websift
//!
//! Query planning and search result curation for grounding assistant
//! replies in current web evidence.
//!
//! Given the recent conversation, websift decides what to look up (read a
//! URL the user referred to, or run web searches), then retrieves raw
//! results from a SearXNG instance and curates them:
//!
//! Planner → SearXNG → Normalizer → URL Filter → Dedup → Diversity → Freshness → top-N
//!
//! ## Design
//!
//! - The planner skips its LLM decision call whenever no URL appears in the
//!   recent turns; a cheaper query-generation call runs instead
//! - Multiple planned queries fan out concurrently and fan back in before
//!   the similarity dedup runs once over the merged set
//! - Near-duplicates are caught with MiniLM sentence embeddings (cosine
//!   similarity), falling back to token-set Jaccard when no model is
//!   available
//! - Every retrieval failure degrades to fewer results; a conversational
//!   turn is never failed by its evidence gathering
//! - Search queries are logged only at trace level
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> websift::Result<()> {
//! use websift::{ChatMessage, Curator, OpenAiChatClient, PipelineConfig, SearxngClient};
//!
//! let curator = Curator::new(
//!     SearxngClient::new("http://localhost:8888"),
//!     OpenAiChatClient::new("http://localhost:11434"),
//!     "llama3.2",
//! );
//!
//! let turns = vec![ChatMessage::user("what's new in rust?")];
//! let results = curator.curate(&turns, &PipelineConfig::default()).await?;
//! for result in &results {
//!     println!("{}: {}", result.name, result.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod planner;
pub mod reader;
pub mod sanitize;
pub mod types;

mod http;
mod orchestrator;

pub use backend::SearxngClient;
pub use config::{PipelineConfig, TimeRange};
pub use error::{CurateError, Result};
pub use llm::{ChatClient, ChatMessage, OpenAiChatClient, Role};
pub use types::{QueryDecision, SearchResult};

/// Plans evidence gathering for a conversation and curates what comes back.
///
/// Owns the search backend client and a chat client used for planning
/// calls. Cloning is cheap when the chat client's clone is.
#[derive(Debug, Clone)]
pub struct Curator<C: ChatClient> {
    search: SearxngClient,
    chat: C,
    model: String,
}

impl<C: ChatClient> Curator<C> {
    /// Create a curator from its two clients and the planning model name.
    pub fn new(search: SearxngClient, chat: C, model: impl Into<String>) -> Self {
        Self {
            search,
            chat,
            model: model.into(),
        }
    }

    /// Plan and execute evidence gathering for the conversation.
    ///
    /// Decides between reading a referenced URL and running searches. A URL
    /// read yields one result whose summary is the page text (engine
    /// `"reader"`); searches run the full curation pipeline and return at
    /// most `config.count` results.
    ///
    /// # Errors
    ///
    /// Returns [`CurateError::Config`] when `config` is invalid. Planning
    /// and retrieval failures never error; they degrade to fewer or zero
    /// results.
    pub async fn curate(
        &self,
        turns: &[ChatMessage],
        config: &PipelineConfig,
    ) -> Result<Vec<SearchResult>> {
        config.validate()?;

        match planner::plan_decision(turns, &self.chat, &self.model).await {
            QueryDecision::ReadUrl { target } => {
                tracing::debug!(url = %target, "reading referenced page");
                let summary = reader::read_url(
                    &target,
                    reader::DEFAULT_MAX_CONTENT_CHARS,
                    reader::DEFAULT_TIMEOUT_SECONDS,
                )
                .await;

                Ok(vec![SearchResult {
                    name: target.clone(),
                    url: target,
                    summary,
                    engine: "reader".to_owned(),
                    relevance: 0.0,
                    published_date: None,
                }])
            }
            QueryDecision::RunSearch { queries } => {
                tracing::debug!(queries = queries.len(), "running planned searches");
                Ok(orchestrator::curate::curate_queries(&self.search, &queries, config).await)
            }
        }
    }

    /// Expose the planning decision without executing it.
    ///
    /// Never fails; see [`planner::plan_decision`] for the fallback ladder.
    pub async fn plan_decision(&self, turns: &[ChatMessage]) -> QueryDecision {
        planner::plan_decision(turns, &self.chat, &self.model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedChat(&'static str);

    impl ChatClient for CannedChat {
        async fn complete(&self, _messages: &[ChatMessage], _model: &str) -> Result<String> {
            Ok(self.0.to_owned())
        }
    }

    fn curator(reply: &'static str) -> Curator<CannedChat> {
        Curator::new(
            SearxngClient::new("http://localhost:1"),
            CannedChat(reply),
            "test-model",
        )
    }

    #[tokio::test]
    async fn curate_rejects_zero_count() {
        let config = PipelineConfig {
            count: 0,
            ..Default::default()
        };

        let err = curator(r#"["q"]"#)
            .curate(&[ChatMessage::user("hi")], &config)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("count"));
    }

    #[tokio::test]
    async fn curate_rejects_bad_threshold() {
        let config = PipelineConfig {
            dedup_threshold: Some(1.5),
            ..Default::default()
        };

        let err = curator(r#"["q"]"#)
            .curate(&[ChatMessage::user("hi")], &config)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("dedup_threshold"));
    }

    #[tokio::test]
    async fn plan_decision_surfaces_planner_output() {
        let decision = curator(r#"["rust news", "rust release"]"#)
            .plan_decision(&[ChatMessage::user("what's new in rust?")])
            .await;

        assert_eq!(
            decision,
            QueryDecision::RunSearch {
                queries: vec!["rust news".to_owned(), "rust release".to_owned()]
            }
        );
    }
}
