//! Error taxonomy for the chat client.

use thiserror::Error;

/// Errors produced by the API client and the widget controller.
///
/// The `Display` form of every variant is the text shown in the chat panel.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The backend answered with a non-success status. `message` is the
    /// payload's `detail` field, or `HTTP <status>` when there was none.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connection refused, DNS,
    /// timeout, reset).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A success status whose body did not match the contract.
    #[error("invalid response from backend: {0}")]
    Decode(String),

    /// The task carrying the request panicked or was cancelled before it
    /// produced a response.
    #[error("request did not complete: {0}")]
    Interrupted(String),

    /// The configured backend URL cannot be used as a base for endpoints.
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),

    /// The access gate did not admit the viewer.
    #[error("chat is only available to signed-in readers")]
    Unauthorized,
}

impl ChatError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ChatError::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of an [`Api`](ChatError::Api) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Api { status, .. } => Some(*status),
            ChatError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
