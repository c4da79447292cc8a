//! Chat widget controller.
//!
//! Orchestrates one widget instance: the open/closed panel, the text input,
//! the selection slot, the conversation store, and the single request that
//! may be in flight.
//!
//! # States
//!
//! ```text
//!            toggle / open                 submit (non-empty, not busy)
//!   Idle ───────────────────▶ OpenEmpty ──────────────────────────────┐
//!    ▲  ◀─── close / Esc ───  OpenActive ◀── success ── Sending ◀─────┘
//!    │                            ▲                       │
//!    └──────── close / Esc ─── Error ◀──── failure ───────┘
//! ```
//!
//! A submit is two-phase. [`WidgetController::begin_submit`] validates the
//! input, commits the user's message to the store straight away and hands
//! back the request to send. [`WidgetController::complete_submit`] applies
//! the outcome. The user's message is never rolled back: a failed turn
//! stays visible next to the error. [`WidgetController::submit`] runs both
//! phases around the client call for callers that do not need to interleave
//! other events with the request.
//!
//! Closing the panel does not cancel anything. A response that lands while
//! the panel is closed is stored and shows up on the next open.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::access::AccessGate;
use crate::client::ChatApi;
use crate::conversation::ConversationStore;
use crate::error::ChatError;
use crate::language::{Language, LanguageContext};
use crate::models::{ChatRequest, ChatResponse, Selection};
use crate::selection::{SelectionCapture, SelectionEvent, SelectionLimits};

/// Visible state of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Panel closed.
    Idle,
    /// Panel open, nothing said yet.
    OpenEmpty,
    /// Panel open with a transcript.
    OpenActive,
    /// Panel open, request in flight, input disabled.
    Sending,
    /// Panel open, last request failed.
    Error,
}

/// A turn that has been committed locally and is waiting for the backend.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub request: ChatRequest,
}

/// Result of [`WidgetController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent: empty input, panel closed, or a request already
    /// in flight.
    Ignored,
    Answered,
    Failed(String),
}

pub struct WidgetController {
    client: Arc<dyn ChatApi>,
    language: LanguageContext,
    store: ConversationStore,
    selection: SelectionCapture,
    input: String,
    open: bool,
    input_focused: bool,
    pending: bool,
    last_error: Option<String>,
}

impl WidgetController {
    /// Mount a widget for the current viewer.
    ///
    /// Fails with [`ChatError::Unauthorized`] when `gate` does not admit
    /// the viewer; the widget itself never looks at credentials.
    pub fn mount(
        client: Arc<dyn ChatApi>,
        language: LanguageContext,
        limits: SelectionLimits,
        gate: &dyn AccessGate,
    ) -> Result<Self, ChatError> {
        if !gate.is_authorized() {
            return Err(ChatError::Unauthorized);
        }
        Ok(Self {
            client,
            language,
            store: ConversationStore::new(),
            selection: SelectionCapture::new(limits),
            input: String::new(),
            open: false,
            input_focused: false,
            pending: false,
            last_error: None,
        })
    }

    pub fn state(&self) -> WidgetState {
        if !self.open {
            WidgetState::Idle
        } else if self.pending {
            WidgetState::Sending
        } else if self.last_error.is_some() {
            WidgetState::Error
        } else if self.store.is_empty() {
            WidgetState::OpenEmpty
        } else {
            WidgetState::OpenActive
        }
    }

    // ── Panel ───────────────────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        if !self.open {
            self.toggle();
        }
    }

    pub fn close(&mut self) {
        if self.open {
            self.toggle();
        }
    }

    /// Flip the panel. Either direction dismisses a shown error.
    pub fn toggle(&mut self) {
        self.open = !self.open;
        self.input_focused = self.open;
        self.last_error = None;
        debug!(open = self.open, "widget toggled");
    }

    /// Escape closes the panel; it does nothing while closed.
    ///
    /// Unlike [`toggle`](Self::toggle) it leaves a shown error in place.
    pub fn escape(&mut self) {
        if self.open {
            self.open = false;
            self.input_focused = false;
            debug!("widget closed by escape");
        }
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    // ── Input ───────────────────────────────────────────────────────────

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text. Ignored while a request is in flight.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.pending {
            return false;
        }
        self.input = text.into();
        true
    }

    pub fn can_send(&self) -> bool {
        self.open && !self.pending && !self.input.trim().is_empty()
    }

    // ── Selection ───────────────────────────────────────────────────────

    pub fn handle_selection_event(&mut self, event: SelectionEvent) -> bool {
        self.selection.handle(event)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.current()
    }

    pub fn selection_capture_mut(&mut self) -> &mut SelectionCapture {
        &mut self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ── Language ────────────────────────────────────────────────────────

    pub fn language(&self) -> LanguageContext {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = LanguageContext::new(language);
    }

    // ── Conversation ────────────────────────────────────────────────────

    pub fn conversation(&self) -> &ConversationStore {
        &self.store
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.store.conversation_id()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn client(&self) -> Arc<dyn ChatApi> {
        Arc::clone(&self.client)
    }

    /// Continue a conversation the backend already knows, e.g. one started
    /// by an earlier process. Only possible before anything was said in
    /// this widget; returns `false` otherwise.
    pub fn resume_conversation(&mut self, conversation_id: impl Into<String>) -> bool {
        if self.pending || !self.store.is_empty() {
            return false;
        }
        self.store.resume(conversation_id);
        true
    }

    /// First phase of a submit.
    ///
    /// Returns `None` without side effects when the panel is closed, the
    /// trimmed input is empty, or a request is already in flight.
    /// Otherwise the user message is appended, the input and any error are
    /// cleared, the widget enters [`WidgetState::Sending`], and the request
    /// to dispatch is returned.
    pub fn begin_submit(&mut self) -> Option<PendingTurn> {
        if self.pending {
            debug!("submit ignored: request already in flight");
            return None;
        }
        if !self.open {
            return None;
        }
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.store.append_user(query.clone());
        self.input.clear();
        self.last_error = None;
        self.pending = true;

        let request = ChatRequest {
            query,
            selected_text: self.selection.context_text(),
            conversation_id: self.store.conversation_id().map(str::to_string),
            language: self.language.language,
        };
        debug!(
            turn = self.store.turns() + 1,
            has_selection = request.selected_text.is_some(),
            "turn dispatched"
        );
        Some(PendingTurn { request })
    }

    /// Second phase of a submit: record the backend's answer or error.
    pub fn complete_submit(
        &mut self,
        turn: PendingTurn,
        result: Result<ChatResponse, ChatError>,
    ) -> SubmitOutcome {
        self.pending = false;
        match result {
            Ok(response) => {
                self.store.append_assistant(&response);
                if let Some(attached) = turn.request.selected_text.as_deref() {
                    // A newer selection made while waiting is kept for the next turn.
                    if self.selection.context_text().as_deref() == Some(attached) {
                        self.selection.clear();
                    }
                }
                info!(
                    conversation_id = %response.conversation_id,
                    sources = response.sources.len(),
                    grounded = response.grounded,
                    "turn answered"
                );
                SubmitOutcome::Answered
            }
            Err(err) => {
                let message = err.user_message();
                warn!(error = %message, "turn failed");
                self.last_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Run a complete turn: begin, call the backend, complete.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(turn) = self.begin_submit() else {
            return SubmitOutcome::Ignored;
        };
        let client = self.client();
        let result = client.send_chat(&turn.request).await;
        self.complete_submit(turn, result)
    }

    /// Start over with an empty transcript.
    ///
    /// The backend is asked to forget the current conversation first; a
    /// failure there is logged and does not stop the local reset. Returns
    /// `false` while a request is in flight.
    pub async fn new_conversation(&mut self) -> bool {
        if self.pending {
            return false;
        }
        if let Some(id) = self.store.conversation_id().map(str::to_string) {
            match self.client.clear_conversation(&id).await {
                Ok(resp) if resp.success => debug!(conversation_id = %id, "backend memory cleared"),
                Ok(resp) => debug!(conversation_id = %id, message = %resp.message, "backend had no memory to clear"),
                Err(e) => warn!(conversation_id = %id, error = %e, "could not clear backend memory"),
            }
        }
        self.store.reset();
        self.last_error = None;
        true
    }
}
