//! Heuristic freshness scoring.
//!
//! Stale evidence misleads more than it helps, so results are ranked by
//! cheap textual recency signals before truncation. The signals are
//! substring checks over summary, title, and URL; no date parsing.

use crate::types::SearchResult;

/// Marker years treated as erroneously future-dated content.
const FUTURE_DATE_MARKERS: [&str; 2] = ["2026", "2027"];

/// Keywords suggesting current-events content.
const FRESHNESS_KEYWORDS: [&str; 4] = ["today", "hoy", "latest", "current"];

const YEAR_BONUS: f64 = 10.0;
const EXACT_DATE_BONUS: f64 = 20.0;
const KEYWORD_BONUS: f64 = 15.0;
const RELEVANCE_WEIGHT: f64 = 5.0;

/// Score results by freshness, descending; ties keep input order.
///
/// `current_date_text` is the rendered current date (e.g. `November 25,
/// 2025`) and `current_year` its year; both are matched case-insensitively
/// as substrings of summary + name + url. Results mentioning a marker year
/// are excluded from the output entirely.
pub fn score_by_freshness(
    results: Vec<SearchResult>,
    current_date_text: &str,
    current_year: i32,
) -> Vec<(f64, SearchResult)> {
    let date_text = current_date_text.to_lowercase();
    let year_text = current_year.to_string();

    let mut scored: Vec<(f64, SearchResult)> = Vec::with_capacity(results.len());

    for result in results {
        let haystack =
            format!("{} {} {}", result.summary, result.name, result.url).to_lowercase();

        if FUTURE_DATE_MARKERS
            .iter()
            .any(|marker| haystack.contains(marker))
        {
            continue;
        }

        let mut score = 0.0;
        if haystack.contains(&year_text) {
            score += YEAR_BONUS;
        }
        if haystack.contains(&date_text) {
            score += EXACT_DATE_BONUS;
        }
        if FRESHNESS_KEYWORDS
            .iter()
            .any(|keyword| haystack.contains(keyword))
        {
            score += KEYWORD_BONUS;
        }
        score += result.relevance * RELEVANCE_WEIGHT;

        scored.push((score, result));
    }

    // Vec::sort_by is stable, so equal scores keep their input order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
}
