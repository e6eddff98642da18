//! Query planning: decide between reading a URL and running searches.
//!
//! Given the trailing conversation turns, the planner produces exactly one
//! [`QueryDecision`]. It never fails: an LLM error or malformed reply
//! degrades to searching for the latest user turn verbatim.
//!
//! When no URL appears in the recent turns there is nothing to classify, so
//! the full decision call (the largest latency contributor) is skipped in
//! favour of a cheaper query-generation call over the latest user turn
//! alone. The URL-presence check is local and deterministic.

pub mod prompt;

mod extract;

use std::sync::LazyLock;

use regex::Regex;

use crate::llm::{ChatClient, ChatMessage, Role};
use crate::types::QueryDecision;

/// How many trailing conversation turns the planner considers.
pub const MAX_CONTEXT_TURNS: usize = 5;

/// Maximum queries a decision may carry.
pub const MAX_QUERIES: usize = 3;

/// Maximum queries generated on the fast path.
const MAX_FAST_PATH_QUERIES: usize = 2;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL regex"));

/// Produce a decision for the conversation's latest turn.
///
/// Considers at most the last [`MAX_CONTEXT_TURNS`] turns. Never fails; see
/// the module docs for the fallback ladder.
pub async fn plan_decision<C: ChatClient>(
    turns: &[ChatMessage],
    chat: &C,
    model: &str,
) -> QueryDecision {
    let window = context_window(turns);

    if !window.iter().any(|turn| URL_RE.is_match(&turn.content)) {
        return fast_path(window, chat, model).await;
    }

    let mut messages = Vec::with_capacity(window.len() + 1);
    messages.push(ChatMessage::system(prompt::DECISION_PROMPT));
    messages.extend(window.iter().cloned());

    match chat.complete(&messages, model).await {
        Ok(reply) => match extract::parse_decision(&reply) {
            Some(decision) => decision,
            None => {
                tracing::debug!(reply_len = reply.len(), "unusable decision reply, falling back");
                fallback_decision(window)
            }
        },
        Err(err) => {
            tracing::debug!(error = %err, "decision call failed, falling back");
            fallback_decision(window)
        }
    }
}

/// Generate 1-2 queries for the latest user turn without a decision call.
async fn fast_path<C: ChatClient>(
    window: &[ChatMessage],
    chat: &C,
    model: &str,
) -> QueryDecision {
    let Some(latest_user) = latest_user_turn(window) else {
        return fallback_decision(window);
    };

    let messages = [
        ChatMessage::system(prompt::QUERY_GENERATION_PROMPT),
        ChatMessage::user(latest_user),
    ];

    match chat.complete(&messages, model).await {
        Ok(reply) => match extract::parse_query_list(&reply) {
            Some(mut queries) => {
                queries.truncate(MAX_FAST_PATH_QUERIES);
                QueryDecision::RunSearch { queries }
            }
            None => fallback_decision(window),
        },
        Err(err) => {
            tracing::debug!(error = %err, "query generation failed, falling back");
            fallback_decision(window)
        }
    }
}

/// The decision of last resort: search for the latest user turn verbatim.
///
/// A window with no user turn at all degrades to the most recent turn of
/// any role, then to an empty query.
fn fallback_decision(window: &[ChatMessage]) -> QueryDecision {
    let query = latest_user_turn(window)
        .or_else(|| window.last().map(|turn| turn.content.as_str()))
        .unwrap_or_default()
        .to_owned();

    QueryDecision::RunSearch {
        queries: vec![query],
    }
}

fn context_window(turns: &[ChatMessage]) -> &[ChatMessage] {
    &turns[turns.len().saturating_sub(MAX_CONTEXT_TURNS)..]
}

fn latest_user_turn(window: &[ChatMessage]) -> Option<&str> {
    window
        .iter()
        .rev()
        .find(|turn| turn.role == Role::User)
        .map(|turn| turn.content.as_str())
}
