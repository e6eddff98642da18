//! Chat-completions client used for query planning.
//!
//! The planner needs exactly one capability from a language model: send a
//! short message list, get the text of the first choice back. [`ChatClient`]
//! captures that, and [`OpenAiChatClient`] implements it against any
//! OpenAI-compatible endpoint (`/v1/chat/completions`, non-streaming).

use serde::{Deserialize, Serialize};

use crate::error::{CurateError, Result};
use crate::http::build_client;

/// Default request timeout for planning calls.
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// The role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant (model) output.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in a chat conversation.
///
/// Serializes to the wire shape chat-completions endpoints expect
/// (`{"role": "...", "content": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A chat completion backend.
///
/// Implementors send the message list to a model and return the raw text of
/// its reply. The planner never depends on more than this, which keeps it
/// testable with scripted fakes.
///
/// All implementations must be `Send + Sync` so planning can run inside
/// spawned tasks.
pub trait ChatClient: Send + Sync {
    /// Request a completion for `messages` from `model`.
    ///
    /// # Errors
    ///
    /// Returns [`CurateError::Llm`] if the request fails, the endpoint
    /// returns a non-success status, or the response cannot be parsed.
    fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Client for OpenAI-compatible chat-completions endpoints.
///
/// Works against OpenAI itself as well as local servers (Ollama, vLLM,
/// llama.cpp) that speak the same protocol. Always requests non-streaming
/// completions.
#[derive(Clone)]
pub struct OpenAiChatClient {
    base_url: String,
    api_key: Option<String>,
    timeout_seconds: u64,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key intentionally omitted.
        f.debug_struct("OpenAiChatClient")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl OpenAiChatClient {
    /// Create a client for the endpoint at `base_url`.
    ///
    /// The base URL is the server root, e.g. `https://api.openai.com` or
    /// `http://localhost:11434`; the `/v1/chat/completions` path is appended
    /// per request. A trailing slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Set a bearer token sent as `Authorization: Bearer <key>`.
    ///
    /// Local endpoints typically need none, so this is opt-in.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ChatClient for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let client = build_client(self.timeout_seconds, None)
            .map_err(|e| CurateError::Llm(format!("failed to build HTTP client: {e}")))?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        let mut request = client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CurateError::Llm(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body_text);
            return Err(CurateError::Llm(format!(
                "chat endpoint returned HTTP {}: {message}",
                status.as_u16()
            )));
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| CurateError::Llm(format!("failed to read chat response: {e}")))?;

        parse_chat_response(&body_text)
    }
}

/// Extract the first choice's message text from a chat-completions response.
///
/// Extracted as a separate function for testability.
pub(crate) fn parse_chat_response(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct ChatResponse {
        #[serde(default)]
        choices: Vec<ChatChoice>,
    }

    #[derive(Deserialize)]
    struct ChatChoice {
        message: ChoiceMessage,
    }

    #[derive(Deserialize)]
    struct ChoiceMessage {
        content: String,
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CurateError::Llm(format!("malformed chat response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| CurateError::Llm("chat response contained no choices".to_owned()))
}

/// Pull a human-readable message out of an error response body.
///
/// OpenAI-style endpoints wrap errors as `{"error": {"message": "..."}}`;
/// anything else is returned verbatim.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_COMPLETION: &str = r#"{
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": "[\"bitcoin price\"]"},
                "finish_reason": "stop"
            }
        ],
        "usage": {"prompt_tokens": 40, "completion_tokens": 8, "total_tokens": 48}
    }"#;

    // ── Role and messages ─────────────────────────────────────

    #[test]
    fn role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }

    #[test]
    fn message_constructors_set_role() {
        assert_eq!(ChatMessage::system("a").role, Role::System);
        assert_eq!(ChatMessage::user("b").role, Role::User);
        assert_eq!(ChatMessage::assistant("c").role, Role::Assistant);
    }

    #[test]
    fn message_wire_shape() {
        let msg = ChatMessage::user("what is rust?");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"what is rust?"}"#);
    }

    // ── Response parsing ──────────────────────────────────────

    #[test]
    fn parse_chat_response_extracts_first_choice() {
        let content = parse_chat_response(MOCK_COMPLETION).unwrap();
        assert_eq!(content, "[\"bitcoin price\"]");
    }

    #[test]
    fn parse_chat_response_empty_choices_errors() {
        let body = r#"{"choices": []}"#;
        let err = parse_chat_response(body).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn parse_chat_response_missing_choices_errors() {
        assert!(parse_chat_response(r#"{"id": "x"}"#).is_err());
    }

    #[test]
    fn parse_chat_response_malformed_errors() {
        assert!(parse_chat_response("not json").is_err());
        assert!(parse_chat_response("").is_err());
    }

    #[test]
    fn extract_error_message_unwraps_openai_shape() {
        let body = r#"{"error": {"message": "invalid model", "type": "invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body), "invalid model");
    }

    #[test]
    fn extract_error_message_passes_through_plain_text() {
        assert_eq!(extract_error_message("upstream timeout"), "upstream timeout");
    }

    // ── Client construction ───────────────────────────────────

    #[test]
    fn new_trims_trailing_slash() {
        let client = OpenAiChatClient::new("http://localhost:11434/");
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn builder_sets_key_and_timeout() {
        let client = OpenAiChatClient::new("http://localhost:11434")
            .with_api_key("sk-test")
            .with_timeout(5);
        assert_eq!(client.timeout_seconds, 5);
        assert_eq!(client.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn debug_omits_api_key() {
        let client = OpenAiChatClient::new("http://localhost:11434").with_api_key("sk-secret");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("sk-secret"));
    }

    // ── Trait bounds ──────────────────────────────────────────

    /// A canned client for checking trait bounds and async execution.
    struct CannedChat(String);

    impl ChatClient for CannedChat {
        async fn complete(&self, _messages: &[ChatMessage], _model: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn canned_client_satisfies_trait() {
        let chat = CannedChat("reply".to_owned());
        let out = chat
            .complete(&[ChatMessage::user("hi")], "test-model")
            .await
            .unwrap();
        assert_eq!(out, "reply");
    }
}
