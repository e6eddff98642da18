//! Per-domain diversity cap.
//!
//! A single outlet dominating the evidence set narrows what the assistant
//! can ground on, so each host contributes at most a fixed number of
//! results.

use std::collections::HashMap;

use url::Url;

use crate::types::SearchResult;

/// Keep at most `max_per_domain` results per host, in first-seen order.
///
/// Host comparison strips a leading `www.` label. A result whose URL fails
/// to parse or has no host is kept unconditionally (fail-open).
pub fn enforce_diversity(results: Vec<SearchResult>, max_per_domain: usize) -> Vec<SearchResult> {
    let mut per_host: HashMap<String, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(results.len());

    for result in results {
        let Some(host) = host_of(&result.url) else {
            kept.push(result);
            continue;
        };

        let count = per_host.entry(host).or_insert(0);
        if *count < max_per_domain {
            *count += 1;
            kept.push(result);
        }
    }

    kept
}

/// Host with any leading `www.` removed; `None` when unparseable.
fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_owned())
}
