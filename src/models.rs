//! Core data models used throughout the chat client.
//!
//! Wire types mirror the backend's JSON contract field for field; the
//! domain types ([`Message`], [`Selection`]) are what the conversation store
//! and selection capture hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A passage of the textbook cited by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReference {
    pub chunk_id: String,
    pub chapter: String,
    pub section: String,
    pub score: f64,
}

/// One entry in the conversation transcript.
///
/// `sources` and `grounded` are only ever set on assistant messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounded: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            sources: None,
            grounded: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(response: &ChatResponse) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: response.answer.clone(),
            sources: Some(response.sources.clone()),
            grounded: Some(response.grounded),
            timestamp: Utc::now(),
        }
    }
}

/// Text the reader highlighted in the book, already trimmed and bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Selection {
    /// First `max_chars` characters of the selection, with `...` appended
    /// when the text is longer.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub language: Language,
}

/// Successful response of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceReference>,
    pub grounded: bool,
    pub conversation_id: String,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub qdrant_connected: bool,
    #[serde(default)]
    pub collection_exists: bool,
    #[serde(default)]
    pub chunk_count: u64,
}

/// Response of `DELETE /api/chat/{conversation_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearConversationResponse {
    pub success: bool,
    pub message: String,
}

/// Response of `GET /api/conversations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationList {
    pub conversations: Vec<String>,
    pub count: u64,
}
