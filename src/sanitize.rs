//! Snippet and title noise removal.
//!
//! Search engines pad snippets with boilerplate ("Read more...", dangling
//! dates, calls to action) that pollutes both display text and similarity
//! comparison. [`clean_text`] strips the known patterns from snippets;
//! [`normalize_title`] reduces a headline to a bare comparison key for the
//! deduplicator. Both are pure and deterministic.

use regex::Regex;
use std::sync::LazyLock;

static READ_MORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Read more\.\.\.").expect("read-more regex"));
static CLICK_HERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Click here.*").expect("click-here regex"));
static TRAILING_ELLIPSIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.\.$").expect("ellipsis regex"));
static DASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+\d{1,2}/\d{1,2}/\d{2,4}").expect("dash-date regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static PUBLISHER_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*-\s*(cnn|bbc|reuters|bloomberg|forbes|techcrunch|the verge).*$")
        .expect("publisher-suffix regex")
});
static TITLE_DASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-\s*\d{1,2}/\d{1,2}/\d{2,4}").expect("title-date regex"));
static PIPE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\|\s*\d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)")
        .expect("pipe-date regex")
});
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word regex"));

/// Strips boilerplate noise from snippet text.
///
/// Removes literal `Read more...` markers, `Click here` and everything after
/// it, a trailing ellipsis, and short dash-attached dates like `- 11/25/2025`,
/// then collapses whitespace runs to single spaces and trims.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = READ_MORE_RE.replace_all(text, "");
    let text = CLICK_HERE_RE.replace_all(&text, "");
    let text = TRAILING_ELLIPSIS_RE.replace_all(&text, "");
    let text = DASH_DATE_RE.replace_all(&text, "");

    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Reduces a title to a lower-cased comparison key.
///
/// Strips known publisher suffixes (`- CNN`, `- Forbes`, ...) together with
/// anything after them, dash- and pipe-attached date fragments, and all
/// punctuation, then collapses whitespace. The output is only meant for
/// similarity comparison, never for display.
pub fn normalize_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let lowered = title.to_lowercase();
    let title = PUBLISHER_SUFFIX_RE.replace_all(&lowered, "");
    let title = TITLE_DASH_DATE_RE.replace_all(&title, "");
    let title = PIPE_DATE_RE.replace_all(&title, "");
    let title = NON_WORD_RE.replace_all(&title, " ");

    WHITESPACE_RE.replace_all(&title, " ").trim().to_string()
}
