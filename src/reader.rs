//! Page fetching and text extraction for the URL-read path.
//!
//! When the planner decides the user is asking about a specific link, the
//! page is fetched here and reduced to readable text for grounding. The
//! entry point never fails: fetch and parse problems come back as
//! `Error: ...` strings so the caller can surface them as evidence without
//! a separate error path.

use scraper::{ElementRef, Html, Selector};

use crate::http::build_client;

/// Default maximum characters of extracted page text.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 8000;

/// Default fetch timeout.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Appended when extracted text exceeds the character limit.
const TRUNCATION_MARKER: &str = "\n\n... [Content truncated]";

/// Elements whose subtrees carry no readable content.
const SKIPPED_TAGS: [&str; 9] = [
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

/// Content-root selectors, most specific first.
const CONTENT_SELECTORS: [&str; 4] = ["article", "main", "[role=\"main\"]", "body"];

/// Fetch a page and return its readable text, truncated to `max_chars`.
///
/// Uses a rotating browser user agent. Timeouts, transport errors,
/// non-success statuses, and unextractable markup all produce an inline
/// `Error: ...` string instead of an `Err`.
pub async fn read_url(url: &str, max_chars: usize, timeout_seconds: u64) -> String {
    let client = match build_client(timeout_seconds, None) {
        Ok(client) => client,
        Err(e) => return format!("Error: Could not read URL {url}: {e}"),
    };

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return format!("Error: Timeout while reading URL {url}"),
        Err(e) => return format!("Error: Could not read URL {url}: {e}"),
    };

    let status = response.status();
    if !status.is_success() {
        return format!("Error: HTTP {} while reading URL {url}", status.as_u16());
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) if e.is_timeout() => return format!("Error: Timeout while reading URL {url}"),
        Err(e) => return format!("Error: Could not read URL {url}: {e}"),
    };

    let text = extract_page_text(&html);
    if text.is_empty() {
        return format!("Error: Could not read URL {url}: no extractable content");
    }

    truncate_at_boundary(&text, max_chars)
}

/// Extract readable text from raw HTML.
///
/// Picks the first content root with any text (`article`, then `main`,
/// `[role="main"]`, `body`), walks its subtree skipping boilerplate
/// elements, and collapses whitespace runs to single spaces.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in &CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for root in document.select(&selector) {
            let mut raw = String::new();
            collect_text(root, &mut raw);
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                return text;
            }
        }
    }

    String::new()
}

/// Append the readable text under `element`, pruning boilerplate subtrees.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        }
    }
}

/// Truncate to `max_chars` bytes at a char boundary and mark the cut.
fn truncate_at_boundary(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_owned();
    }

    let mut end = max_chars;
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }

    let mut truncated = text[..end].to_owned();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
