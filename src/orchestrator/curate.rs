//! Pipeline driver: fan queries out, fan results in, curate.

use std::collections::HashSet;

use chrono::{Datelike, Local};
use futures::future::join_all;

use crate::backend::SearxngClient;
use crate::config::PipelineConfig;
use crate::types::{RawRecord, SearchResult};

use super::{dedup, diversity, freshness, url_filter};

/// Run `queries` through the full curation pipeline.
///
/// One backend call per query, issued concurrently. Each query's records
/// are normalized and URL-filtered, then merged across queries by exact URL
/// string (first seen wins) so the heavier similarity dedup runs once over
/// the combined set and catches near-duplicates across queries too. After
/// dedup: per-domain diversity, freshness scoring against the current local
/// date, truncation to `config.count`.
///
/// Transient backend failures surface as fewer results, never as errors.
pub async fn curate_queries(
    client: &SearxngClient,
    queries: &[String],
    config: &PipelineConfig,
) -> Vec<SearchResult> {
    let searches = queries.iter().map(|query| {
        client.search(query, config.count, config.time_range, config.timeout_seconds)
    });
    let per_query = join_all(searches).await;

    let filtered: Vec<Vec<SearchResult>> = per_query
        .into_iter()
        .map(|records| {
            let normalized: Vec<SearchResult> =
                records.into_iter().map(RawRecord::normalize).collect();
            url_filter::filter_results(normalized)
        })
        .collect();

    let merged = merge_by_url(filtered);
    tracing::debug!(candidates = merged.len(), "merged filtered results");

    // Embedding inference blocks, so the dedup pass leaves the async runtime.
    let threshold = config.dedup_threshold;
    let deduped = match tokio::task::spawn_blocking(move || dedup::dedupe(merged, threshold)).await
    {
        Ok(deduped) => deduped,
        Err(err) => {
            tracing::warn!(error = %err, "dedup task failed, dropping result set");
            return Vec::new();
        }
    };

    let diversified = diversity::enforce_diversity(deduped, config.max_per_domain);

    let now = Local::now();
    let current_date_text = now.format("%B %d, %Y").to_string();
    let scored = freshness::score_by_freshness(diversified, &current_date_text, now.year());

    scored
        .into_iter()
        .map(|(_, result)| result)
        .take(config.count)
        .collect()
}

/// Merge per-query batches, dropping exact-URL repeats (first seen wins).
fn merge_by_url(batches: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for batch in batches {
        for result in batch {
            if seen.insert(result.url.clone()) {
                merged.push(result);
            }
        }
    }

    merged
}
