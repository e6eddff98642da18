//! Core types: canonical search results, raw backend records, and the
//! planner's query decision.

use serde::{Deserialize, Serialize};

use crate::sanitize;

/// A single curated search result.
///
/// Produced by normalising a [`RawRecord`]; immutable once produced. `name`
/// and `summary` are always present (possibly empty) strings, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title. `"Untitled"` when the backend omitted one.
    pub name: String,
    /// Canonical absolute URL.
    pub url: String,
    /// Sanitised snippet text; may be empty.
    pub summary: String,
    /// Originating sub-engine identifier, `"unknown"` when absent.
    pub engine: String,
    /// Backend-native relevance score, 0 when absent.
    pub relevance: f64,
    /// Free-form published-date text. Presence is neither guaranteed nor
    /// validated; only some backend engines supply it.
    pub published_date: Option<String>,
}

/// A raw record as returned by the search backend's JSON API.
///
/// Every field is optional: the backend aggregates heterogeneous engines and
/// none of them agree on which fields they fill in. Defaults are applied by
/// [`RawRecord::normalize`] and maybe-present fields never travel past it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub engine: Option<String>,
    pub score: Option<f64>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
}

impl RawRecord {
    /// Normalises this record into a [`SearchResult`].
    ///
    /// The summary prefers `content` and falls back to the title when
    /// `content` is missing or empty; either way it is run through
    /// [`sanitize::clean_text`]. Missing title, engine, and score take the
    /// documented defaults.
    pub fn normalize(self) -> SearchResult {
        let raw_summary = match self.content {
            Some(ref content) if !content.is_empty() => content.clone(),
            _ => self.title.clone().unwrap_or_default(),
        };

        SearchResult {
            name: self.title.unwrap_or_else(|| "Untitled".to_string()),
            url: self.url.unwrap_or_default(),
            summary: sanitize::clean_text(&raw_summary),
            engine: self.engine.unwrap_or_else(|| "unknown".to_string()),
            relevance: self.score.unwrap_or(0.0),
            published_date: self.published_date,
        }
    }
}

/// The planner's verdict on what to retrieve for the current turn.
///
/// Mirrors the JSON shape the decision model is asked to emit, so a reply
/// fragment like `{"type": "search", "queries": ["rust 1.85 release"]}`
/// deserialises directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueryDecision {
    /// Fetch a single previously mentioned resource.
    #[serde(rename = "url")]
    ReadUrl {
        #[serde(rename = "url")]
        target: String,
    },
    /// Run one to three search queries.
    #[serde(rename = "search")]
    RunSearch { queries: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_serde_round_trip() {
        let result = SearchResult {
            name: "Test".into(),
            url: "https://test.com".into(),
            summary: "snippet".into(),
            engine: "brave".into(),
            relevance: 0.9,
            published_date: Some("2025-11-24".into()),
        };
        let json = serde_json::to_string(&result).expect("serialize");
        let decoded: SearchResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, result);
    }

    #[test]
    fn normalize_applies_defaults() {
        let result = RawRecord::default().normalize();
        assert_eq!(result.name, "Untitled");
        assert_eq!(result.url, "");
        assert_eq!(result.summary, "");
        assert_eq!(result.engine, "unknown");
        assert!((result.relevance - 0.0).abs() < f64::EPSILON);
        assert!(result.published_date.is_none());
    }

    #[test]
    fn normalize_copies_fields_through() {
        let raw = RawRecord {
            title: Some("Rust 1.85 released".into()),
            content: Some("The release brings...".into()),
            url: Some("https://blog.rust-lang.org/2025".into()),
            engine: Some("duckduckgo".into()),
            score: Some(2.5),
            published_date: Some("2025-02-20".into()),
        };
        let result = raw.normalize();
        assert_eq!(result.name, "Rust 1.85 released");
        assert_eq!(result.summary, "The release brings...");
        assert_eq!(result.engine, "duckduckgo");
        assert!((result.relevance - 2.5).abs() < f64::EPSILON);
        assert_eq!(result.published_date.as_deref(), Some("2025-02-20"));
    }

    #[test]
    fn normalize_summary_falls_back_to_title() {
        let raw = RawRecord {
            title: Some("Only a title".into()),
            content: Some(String::new()),
            ..RawRecord::default()
        };
        assert_eq!(raw.normalize().summary, "Only a title");
    }

    #[test]
    fn normalize_sanitises_summary() {
        let raw = RawRecord {
            content: Some("Useful   text Read more...".into()),
            ..RawRecord::default()
        };
        assert_eq!(raw.normalize().summary, "Useful text");
    }

    #[test]
    fn raw_record_parses_backend_shape() {
        let json = r#"{
            "title": "Example",
            "content": "Snippet",
            "url": "https://example.com",
            "engine": "google",
            "score": 1.25,
            "publishedDate": "2025-11-20T00:00:00"
        }"#;
        let raw: RawRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(raw.title.as_deref(), Some("Example"));
        assert_eq!(raw.published_date.as_deref(), Some("2025-11-20T00:00:00"));
    }

    #[test]
    fn raw_record_tolerates_missing_fields() {
        let raw: RawRecord = serde_json::from_str("{}").expect("deserialize");
        assert!(raw.title.is_none());
        assert!(raw.score.is_none());
    }

    #[test]
    fn decision_parses_url_shape() {
        let json = r#"{"type": "url", "url": "https://example.com/doc"}"#;
        let decision: QueryDecision = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            decision,
            QueryDecision::ReadUrl {
                target: "https://example.com/doc".into()
            }
        );
    }

    #[test]
    fn decision_parses_search_shape() {
        let json = r#"{"type": "search", "queries": ["bitcoin price", "btc usd"]}"#;
        let decision: QueryDecision = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            decision,
            QueryDecision::RunSearch {
                queries: vec!["bitcoin price".into(), "btc usd".into()]
            }
        );
    }

    #[test]
    fn decision_ignores_extra_fields() {
        let json = r#"{"type": "search", "queries": ["q"], "reason": "model chatter"}"#;
        let decision: QueryDecision = serde_json::from_str(json).expect("deserialize");
        assert!(matches!(decision, QueryDecision::RunSearch { .. }));
    }

    #[test]
    fn decision_rejects_unknown_tag() {
        let json = r#"{"type": "browse", "url": "https://example.com"}"#;
        assert!(serde_json::from_str::<QueryDecision>(json).is_err());
    }
}
