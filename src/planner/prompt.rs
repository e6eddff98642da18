//! Prompt constants for the planning calls.

// ── Fast-path query generation ───────────────────────────────────────────────

/// System prompt for the fast path.
///
/// Asks the model for one or two short queries answering the latest user
/// message alone. The reply must be a bare JSON array so the fragment
/// extractor can pick it up even when the model adds prose around it.
pub const QUERY_GENERATION_PROMPT: &str = r#"You generate web search queries.

Given the user's message, produce 1-2 short search queries that would find current information answering it.

Rules:
- Write the queries in the same language the user wrote in.
- Keep them keyword-style: short phrases, never full sentences or questions.
- Prefer specific terms over broad ones.

Respond with a JSON array of strings and nothing else. Example:
["bitcoin price usd", "btc market today"]"#;

// ── Full decision call ───────────────────────────────────────────────────────

/// System prompt for the url-vs-search decision.
///
/// Used only when a URL appears in the recent conversation. The model
/// classifies the latest message as either referring to that link or
/// needing fresh searches, and answers with a single JSON object.
pub const DECISION_PROMPT: &str = r#"You decide how to gather web evidence for the user's latest message, given the recent conversation.

Pick exactly one of two actions:

1. The user is asking about a link that already appears in the conversation (summarizing it, explaining it, following up on it). Respond:
{"type": "url", "url": "<the exact URL from the conversation>"}

2. The user needs fresh information from the web. Respond:
{"type": "search", "queries": ["<query 1>", "<query 2>"]}

Rules for search queries:
- 1 to 3 queries, in the same language the user wrote in.
- Keyword-style: short phrases, never full sentences or questions.

Respond with a single JSON object and nothing else."#;
