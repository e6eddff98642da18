//! Near-duplicate removal by comparison-text similarity.
//!
//! Each result is reduced to a comparison string (normalized title plus
//! sanitized summary) and checked against every already-accepted result.
//! Anything too similar to an accepted entry is dropped; first-seen order
//! wins. The comparison is O(n²) over the candidate set, which stays cheap
//! at tens of results per query.
//!
//! The primary strategy embeds comparison strings and measures cosine
//! similarity (threshold 0.75). When no embedding engine is available the
//! stage falls back to token-set Jaccard similarity with a looser 0.6
//! threshold. One strategy runs per call, never a mix.

use std::collections::HashSet;

use crate::embedding::{self, cosine_similarity, EmbeddingEngine};
use crate::sanitize::normalize_title;
use crate::types::SearchResult;

/// Similarity above which an embedded pair counts as duplicates.
const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.75;

/// Similarity above which a Jaccard pair counts as duplicates.
const DEFAULT_LEXICAL_THRESHOLD: f64 = 0.6;

/// Remove near-duplicates, keeping the first occurrence of each.
///
/// Uses the process-wide embedding engine when it loads, the lexical
/// fallback otherwise. `threshold` overrides the strategy's default when
/// set; similarity strictly greater than the threshold rejects.
///
/// Blocking: embedding inference runs on the calling thread.
pub fn dedupe(results: Vec<SearchResult>, threshold: Option<f64>) -> Vec<SearchResult> {
    if let Some(engine) = embedding::shared() {
        match engine.lock() {
            Ok(mut engine) => {
                let threshold = threshold.unwrap_or(DEFAULT_SEMANTIC_THRESHOLD);
                return dedupe_semantic(results, threshold, &mut engine);
            }
            Err(_) => {
                tracing::warn!("embedding engine lock poisoned, using lexical dedup");
            }
        }
    }

    dedupe_lexical(results, threshold.unwrap_or(DEFAULT_LEXICAL_THRESHOLD))
}

/// Embedding-based pass: cosine similarity against the accepted set.
fn dedupe_semantic(
    results: Vec<SearchResult>,
    threshold: f64,
    engine: &mut EmbeddingEngine,
) -> Vec<SearchResult> {
    let mut accepted: Vec<SearchResult> = Vec::with_capacity(results.len());
    let mut accepted_embeddings: Vec<Vec<f32>> = Vec::with_capacity(results.len());

    for result in results {
        let text = comparison_text(&result);
        let candidate = match engine.embed(&text) {
            Ok(embedding) => embedding,
            Err(err) => {
                // An unembeddable result can't be compared, so keep it.
                tracing::debug!(error = %err, url = %result.url, "embed failed, keeping result unchecked");
                accepted.push(result);
                continue;
            }
        };

        let duplicate = accepted_embeddings
            .iter()
            .any(|seen| f64::from(cosine_similarity(seen, &candidate)) > threshold);

        if !duplicate {
            accepted.push(result);
            accepted_embeddings.push(candidate);
        }
    }

    accepted
}

/// Lexical pass: token-set Jaccard against the accepted set.
fn dedupe_lexical(results: Vec<SearchResult>, threshold: f64) -> Vec<SearchResult> {
    let mut accepted: Vec<SearchResult> = Vec::with_capacity(results.len());
    let mut accepted_texts: Vec<String> = Vec::with_capacity(results.len());

    for result in results {
        let text = comparison_text(&result);

        let duplicate = accepted_texts
            .iter()
            .any(|seen| jaccard(seen, &text) > threshold);

        if !duplicate {
            accepted.push(result);
            accepted_texts.push(text);
        }
    }

    accepted
}

/// The string a result is compared by: normalized title plus summary.
fn comparison_text(result: &SearchResult) -> String {
    format!("{} {}", normalize_title(&result.name), result.summary)
}

/// Token-set Jaccard similarity in `[0.0, 1.0]`.
///
/// An empty union is defined as 0.0, mirroring the zero-norm cosine rule.
fn jaccard(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();

    intersection as f64 / union as f64
}
