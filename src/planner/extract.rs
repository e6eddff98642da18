//! Best-effort extraction of JSON fragments from free-form model replies.
//!
//! Models rarely return bare JSON even when told to; replies come wrapped
//! in prose, code fences, or both. These parsers pull the first balanced
//! bracketed fragment out of the text and validate its shape. They return
//! `None` on any mismatch so the planner can fall back instead of failing.

use crate::types::QueryDecision;

use super::MAX_QUERIES;

/// Parse a query list from the first `[...]` fragment of a reply.
///
/// Queries are trimmed; empty entries are dropped. Returns `None` when no
/// balanced array exists, the fragment is not an array of strings, or no
/// usable query remains.
pub(crate) fn parse_query_list(reply: &str) -> Option<Vec<String>> {
    let fragment = first_balanced(reply, b'[', b']')?;
    let raw: Vec<String> = serde_json::from_str(fragment).ok()?;

    let queries: Vec<String> = raw
        .into_iter()
        .map(|q| q.trim().to_owned())
        .filter(|q| !q.is_empty())
        .collect();

    if queries.is_empty() {
        return None;
    }
    Some(queries)
}

/// Parse a planning decision from the first `{...}` fragment of a reply.
///
/// Validates shape after parsing: a url decision needs a non-empty target,
/// a search decision needs at least one non-empty query. Search queries are
/// capped at [`MAX_QUERIES`].
pub(crate) fn parse_decision(reply: &str) -> Option<QueryDecision> {
    let fragment = first_balanced(reply, b'{', b'}')?;
    let decision: QueryDecision = serde_json::from_str(fragment).ok()?;

    match decision {
        QueryDecision::ReadUrl { target } => {
            let target = target.trim().to_owned();
            if target.is_empty() {
                return None;
            }
            Some(QueryDecision::ReadUrl { target })
        }
        QueryDecision::RunSearch { queries } => {
            let mut queries: Vec<String> = queries
                .into_iter()
                .map(|q| q.trim().to_owned())
                .filter(|q| !q.is_empty())
                .collect();
            if queries.is_empty() {
                return None;
            }
            queries.truncate(MAX_QUERIES);
            Some(QueryDecision::RunSearch { queries })
        }
    }
}

/// Slice out the first balanced `open`..`close` fragment of `text`.
///
/// Tracks JSON string literals so brackets inside quoted strings (and
/// escaped quotes inside those) don't confuse the depth count. Both
/// delimiters must be ASCII, which keeps byte indexing boundary-safe.
fn first_balanced(text: &str, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == open)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..=i]);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── first_balanced ────────────────────────────────────────

    #[test]
    fn array_extracted_from_prose() {
        let reply = r#"Sure! Here are the queries: ["a", "b"] — hope that helps."#;
        assert_eq!(
            first_balanced(reply, b'[', b']'),
            Some(r#"["a", "b"]"#)
        );
    }

    #[test]
    fn nested_brackets_balanced() {
        let reply = "[[1, 2], [3]]";
        assert_eq!(first_balanced(reply, b'[', b']'), Some("[[1, 2], [3]]"));
    }

    #[test]
    fn brackets_inside_strings_ignored() {
        let reply = r#"["a ] b", "c"]"#;
        assert_eq!(first_balanced(reply, b'[', b']'), Some(reply));
    }

    #[test]
    fn escaped_quotes_inside_strings_handled() {
        let reply = r#"{"url": "https://example.com/\"quoted\""}"#;
        assert_eq!(first_balanced(reply, b'{', b'}'), Some(reply));
    }

    #[test]
    fn missing_or_unterminated_fragment_is_none() {
        assert_eq!(first_balanced("no json here", b'[', b']'), None);
        assert_eq!(first_balanced(r#"["a", "b""#, b'[', b']'), None);
        assert_eq!(first_balanced("", b'{', b'}'), None);
    }

    // ── parse_query_list ──────────────────────────────────────

    #[test]
    fn query_list_trims_and_drops_blanks() {
        let reply = r#"["  bitcoin price  ", "", "btc news"]"#;
        assert_eq!(
            parse_query_list(reply),
            Some(vec!["bitcoin price".to_owned(), "btc news".to_owned()])
        );
    }

    #[test]
    fn query_list_in_code_fence() {
        let reply = "```json\n[\"rust traits\"]\n```";
        assert_eq!(parse_query_list(reply), Some(vec!["rust traits".to_owned()]));
    }

    #[test]
    fn query_list_rejects_non_strings() {
        assert_eq!(parse_query_list("[1, 2, 3]"), None);
    }

    #[test]
    fn query_list_all_blank_is_none() {
        assert_eq!(parse_query_list(r#"["", "   "]"#), None);
        assert_eq!(parse_query_list("[]"), None);
    }

    #[test]
    fn query_list_without_array_is_none() {
        assert_eq!(parse_query_list("I could not come up with queries."), None);
    }

    // ── parse_decision ────────────────────────────────────────

    #[test]
    fn url_decision_parses() {
        let reply = r#"{"type": "url", "url": "https://example.com/article"}"#;
        assert_eq!(
            parse_decision(reply),
            Some(QueryDecision::ReadUrl {
                target: "https://example.com/article".to_owned()
            })
        );
    }

    #[test]
    fn url_decision_wrapped_in_prose() {
        let reply = r#"The user refers to the link, so: {"type": "url", "url": "https://a.io/x"} is my answer."#;
        assert_eq!(
            parse_decision(reply),
            Some(QueryDecision::ReadUrl {
                target: "https://a.io/x".to_owned()
            })
        );
    }

    #[test]
    fn url_decision_empty_target_is_none() {
        assert_eq!(parse_decision(r#"{"type": "url", "url": ""}"#), None);
        assert_eq!(parse_decision(r#"{"type": "url", "url": "   "}"#), None);
    }

    #[test]
    fn search_decision_parses() {
        let reply = r#"{"type": "search", "queries": ["a", "b"]}"#;
        assert_eq!(
            parse_decision(reply),
            Some(QueryDecision::RunSearch {
                queries: vec!["a".to_owned(), "b".to_owned()]
            })
        );
    }

    #[test]
    fn search_decision_caps_queries() {
        let reply = r#"{"type": "search", "queries": ["a", "b", "c", "d", "e"]}"#;
        let Some(QueryDecision::RunSearch { queries }) = parse_decision(reply) else {
            panic!("expected a search decision");
        };
        assert_eq!(queries, vec!["a", "b", "c"]);
    }

    #[test]
    fn search_decision_without_queries_is_none() {
        assert_eq!(parse_decision(r#"{"type": "search", "queries": []}"#), None);
        assert_eq!(
            parse_decision(r#"{"type": "search", "queries": ["  ", ""]}"#),
            None
        );
    }

    #[test]
    fn unknown_type_is_none() {
        assert_eq!(parse_decision(r#"{"type": "summarize", "url": "x"}"#), None);
    }

    #[test]
    fn malformed_reply_is_none() {
        assert_eq!(parse_decision("search for bitcoin"), None);
        assert_eq!(parse_decision(r#"{"type": "url""#), None);
    }
}
