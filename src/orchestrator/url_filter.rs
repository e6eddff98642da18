//! URL hygiene: drop junk result URLs and strip tracking noise.
//!
//! AMP mirrors, feed endpoints, and redirect/tracker URLs make poor
//! evidence, so those results are dropped outright. Surviving URLs are
//! rewritten without tracking parameters or fragments so later stages
//! compare equivalent pages as equal.

use url::Url;

use crate::types::SearchResult;

/// Query parameters stripped during normalization.
const TRACKING_PARAMS: [&str; 10] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "fbclid",
    "gclid",
    "msclkid",
    "mc_cid",
    "mc_eid",
];

/// URL substrings marking AMP page variants.
const AMP_PATTERNS: [&str; 4] = ["/amp/", "?amp=", ".amp", "/amp."];

/// URL substrings marking redirect or tracker endpoints.
const TRACKER_PATTERNS: [&str; 3] = ["tracking", "redirect", "goto"];

/// Drop results with junk URLs and normalize the survivors' URLs in place.
///
/// Order-preserving.
pub fn filter_results(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.retain(|result| is_clean(&result.url));
    for result in &mut results {
        result.url = normalize_url(&result.url);
    }
    results
}

/// Returns `false` for empty URLs, AMP variants, feed endpoints, and
/// tracker URLs.
fn is_clean(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    let lower = url.to_lowercase();

    if AMP_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return false;
    }
    if lower.ends_with(".rss")
        || lower.ends_with(".xml")
        || lower.contains("/rss/")
        || lower.contains("/feed/")
    {
        return false;
    }
    if TRACKER_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return false;
    }

    true
}

/// Strip tracking parameters, the fragment, and any trailing path slash.
///
/// Remaining query parameters keep their original order. A URL that fails
/// to parse is returned unchanged, never an error.
pub(crate) fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_owned();
    };

    parsed.set_fragment(None);

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        let mut serializer = parsed.query_pairs_mut();
        serializer.clear();
        for (key, value) in &kept {
            serializer.append_pair(key, value);
        }
    }

    let path = parsed.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_owned();
        parsed.set_path(&trimmed);
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_url(url: &str) -> SearchResult {
        SearchResult {
            name: "Title".to_owned(),
            url: url.to_owned(),
            summary: "Summary".to_owned(),
            engine: "google".to_owned(),
            relevance: 1.0,
            published_date: None,
        }
    }

    // ── Filtering ─────────────────────────────────────────────

    #[test]
    fn mixed_batch_keeps_exactly_the_clean_pair() {
        let results = vec![
            result_with_url("https://example.com/article"),
            result_with_url("https://example.com/amp/article"),
            result_with_url("https://example.com/article?amp=1"),
            result_with_url("https://example.com/feed.rss"),
            result_with_url("https://example.com/feed.xml"),
            result_with_url("https://example.com/tracking/redirect"),
            result_with_url("https://example2.com/news"),
        ];

        let kept = filter_results(results);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].url, "https://example.com/article");
        assert_eq!(kept[1].url, "https://example2.com/news");
    }

    #[test]
    fn amp_variants_dropped() {
        assert!(!is_clean("https://example.com/amp/story"));
        assert!(!is_clean("https://example.com/story?amp=true"));
        assert!(!is_clean("https://example.com/story.amp"));
        assert!(!is_clean("https://example.com/amp.story.html"));
    }

    #[test]
    fn feed_endpoints_dropped() {
        assert!(!is_clean("https://example.com/news.rss"));
        assert!(!is_clean("https://example.com/sitemap.xml"));
        assert!(!is_clean("https://example.com/rss/latest"));
        assert!(!is_clean("https://example.com/feed/posts"));
    }

    #[test]
    fn tracker_urls_dropped() {
        assert!(!is_clean("https://ads.example.com/tracking?id=1"));
        assert!(!is_clean("https://example.com/redirect?to=elsewhere"));
        assert!(!is_clean("https://example.com/goto/partner"));
    }

    #[test]
    fn patterns_match_case_insensitively() {
        assert!(!is_clean("https://example.com/AMP/story"));
        assert!(!is_clean("https://example.com/News.RSS"));
        assert!(!is_clean("https://example.com/Redirect"));
    }

    #[test]
    fn ordinary_urls_survive() {
        assert!(is_clean("https://example.com/article"));
        assert!(is_clean("https://example.com/2024/11/05/election"));
        assert!(is_clean("https://example.com/page?q=rust&id=3"));
    }

    #[test]
    fn urlless_records_dropped() {
        // Normalization defaults a missing url to "", which must not surface.
        let kept = filter_results(vec![
            result_with_url(""),
            result_with_url("https://example.com/article"),
        ]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://example.com/article");
    }

    // ── Normalization ─────────────────────────────────────────

    #[test]
    fn utm_params_dropped_plain_params_kept() {
        let out =
            normalize_url("https://example.com/article?utm_source=twitter&utm_medium=social&id=123");
        assert_eq!(out, "https://example.com/article?id=123");
    }

    #[test]
    fn fbclid_dropped_ref_kept() {
        let out = normalize_url("https://example.com/page/?fbclid=abc123&ref=home");
        assert_eq!(out, "https://example.com/page?ref=home");
    }

    #[test]
    fn all_click_ids_dropped() {
        let out = normalize_url(
            "https://example.com/p?gclid=a&msclkid=b&mc_cid=c&mc_eid=d&utm_campaign=e&utm_content=f&utm_term=g",
        );
        assert_eq!(out, "https://example.com/p");
    }

    #[test]
    fn param_order_preserved() {
        let out = normalize_url("https://example.com/s?z=1&a=2&m=3");
        assert_eq!(out, "https://example.com/s?z=1&a=2&m=3");
    }

    #[test]
    fn fragment_dropped() {
        let out = normalize_url("https://example.com/page#section-3");
        assert_eq!(out, "https://example.com/page");
    }

    #[test]
    fn trailing_slash_stripped() {
        assert_eq!(
            normalize_url("https://example.com/path/"),
            "https://example.com/path"
        );
        assert_eq!(
            normalize_url("https://example.com/a/b//"),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn unparseable_url_returned_unchanged() {
        assert_eq!(normalize_url("not a url"), "not a url");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn plain_url_unchanged() {
        assert_eq!(
            normalize_url("https://example.com/article"),
            "https://example.com/article"
        );
    }
}
