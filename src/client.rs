//! HTTP client for the textbook RAG backend.
//!
//! Defines the [`ChatApi`] trait the widget controller talks to, and
//! [`HttpChatClient`], the `reqwest` implementation of it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST`   | `/api/chat` | One conversational turn |
//! | `GET`    | `/api/health` | Backend readiness |
//! | `DELETE` | `/api/chat/{conversation_id}` | Forget a conversation's memory |
//! | `GET`    | `/api/conversations` | Active conversation ids |
//!
//! # Error Contract
//!
//! Non-success responses may carry `{"detail": "..."}`. The detail becomes
//! the error message; when the body is not JSON or has no usable detail, the
//! message is `HTTP <status>`. Requests are never retried and nothing is
//! cached: a failed turn is retried by the user sending it again.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ChatError;
use crate::models::{
    ChatRequest, ChatResponse, ClearConversationResponse, ConversationList, HealthResponse,
};

/// Operations the widget needs from the backend.
///
/// Implemented by [`HttpChatClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send one user turn and wait for the answer.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Report backend readiness. Informational only.
    async fn health(&self) -> Result<HealthResponse, ChatError>;

    /// Ask the backend to drop its memory of a conversation.
    async fn clear_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<ClearConversationResponse, ChatError>;

    /// List conversation ids the backend currently remembers.
    async fn list_conversations(&self) -> Result<ConversationList, ChatError>;
}

pub struct HttpChatClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpChatClient {
    /// Create a client rooted at `base_url`.
    ///
    /// `timeout` of `None` leaves the transport's own behaviour in place.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ChatError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|_| ChatError::InvalidUrl(trimmed.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ChatError::InvalidUrl(trimmed.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base,
            http: builder.build()?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChatError> {
        Self::new(
            &config.api_base_url(),
            config.backend.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl ChatApi for HttpChatClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let url = self.endpoint(&["api", "chat"]);
        debug!(
            url = url.as_str(),
            has_selection = request.selected_text.is_some(),
            conversation_id = request.conversation_id.as_deref().unwrap_or("-"),
            language = %request.language,
            "sending chat turn"
        );

        let response = self.http.post(url).json(request).send().await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<HealthResponse, ChatError> {
        let response = self.http.get(self.endpoint(&["api", "health"])).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::api(
                status.as_u16(),
                format!("Health check failed: HTTP {}", status.as_u16()),
            ));
        }
        read_json(response).await
    }

    async fn clear_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<ClearConversationResponse, ChatError> {
        let url = self.endpoint(&["api", "chat", conversation_id]);
        let response = self.http.delete(url).send().await?;
        read_json(response).await
    }

    async fn list_conversations(&self) -> Result<ConversationList, ChatError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "conversations"]))
            .send()
            .await?;
        read_json(response).await
    }
}

/// Decode a success body as `T`, or turn a failure into [`ChatError::Api`].
///
/// A non-success status always yields `Api`, even when its body cannot be
/// read.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChatError> {
    let status = response.status();

    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "could not read error body");
                String::new()
            }
        };
        let err = error_from_body(status, &body);
        warn!(status = status.as_u16(), error = %err, "backend returned an error");
        return Err(err);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ChatError::Decode(e.to_string()))
}

/// Build the error for a non-success response.
///
/// A string `detail` is used verbatim; a structured one (validation error
/// lists) is rendered as JSON. Anything else falls back to `HTTP <status>`.
pub fn error_from_body(status: StatusCode, body: &str) -> ChatError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .and_then(|d| match d {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

    let message = detail.unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    ChatError::api(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(status: u16, body: &str) -> String {
        error_from_body(StatusCode::from_u16(status).unwrap(), body).to_string()
    }

    #[test]
    fn detail_string_becomes_message() {
        assert_eq!(message(500, r#"{"detail":"backend down"}"#), "backend down");
    }

    #[test]
    fn unparsable_body_falls_back_to_status() {
        assert_eq!(message(500, "<html>Bad Gateway</html>"), "HTTP 500");
        assert_eq!(message(502, ""), "HTTP 502");
    }

    #[test]
    fn missing_or_empty_detail_falls_back_to_status() {
        assert_eq!(message(404, r#"{"error":"nope"}"#), "HTTP 404");
        assert_eq!(message(503, r#"{"detail":null}"#), "HTTP 503");
        assert_eq!(message(500, r#"{"detail":"  "}"#), "HTTP 500");
        assert_eq!(message(500, r#"["detail"]"#), "HTTP 500");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let msg = message(422, r#"{"detail":[{"loc":["body","query"]}]}"#);
        assert!(msg.starts_with('['));
        assert!(msg.contains("query"));
    }

    #[test]
    fn endpoints_join_onto_base_path() {
        let client = HttpChatClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(
            client.endpoint(&["api", "chat"]).as_str(),
            "http://localhost:8000/api/chat"
        );

        let prefixed = HttpChatClient::new("https://books.example.org/assistant", None).unwrap();
        assert_eq!(
            prefixed.endpoint(&["api", "health"]).as_str(),
            "https://books.example.org/assistant/api/health"
        );
    }

    #[test]
    fn conversation_ids_are_path_escaped() {
        let client = HttpChatClient::new("http://localhost:8000", None).unwrap();
        let url = client.endpoint(&["api", "chat", "a/b c"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/chat/a%2Fb%20c");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            HttpChatClient::new("localhost:8000", None),
            Err(ChatError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpChatClient::new("ftp://example.org", None),
            Err(ChatError::InvalidUrl(_))
        ));
    }
}
