//! Text-selection capture.
//!
//! Turns the host document's selection events into an optional, bounded
//! piece of context for the next chat turn. The capture holds a single
//! slot: every qualifying selection replaces the previous one, and
//! selections that are collapsed or too short are ignored without touching
//! the slot.
//!
//! Hosts feed [`SelectionEvent`]s in; interested parties register with
//! [`SelectionCapture::on_selection_change`] and are called whenever the slot
//! changes. Nothing here reads from or writes to the document itself.
//!
//! ```rust
//! use book_chat::selection::{RawSelection, SelectionCapture, SelectionEvent};
//!
//! let mut capture = SelectionCapture::default();
//! capture.handle(SelectionEvent::pointer_up(RawSelection::new("hi", 0, 2)));
//! assert!(!capture.has_selection());
//!
//! capture.handle(SelectionEvent::pointer_up(RawSelection::new(
//!     "  Sensors measure the physical world.  ",
//!     4,
//!     41,
//! )));
//! assert_eq!(
//!     capture.current().map(|s| s.text.as_str()),
//!     Some("Sensors measure the physical world.")
//! );
//! ```

use tracing::debug;

use crate::config::SelectionConfig;
use crate::models::Selection;

/// Marker appended to selections cut at the length limit.
pub const ELLIPSIS: &str = "...";

/// What the user did that may have changed the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTrigger {
    /// Pointer released, typically at the end of a drag.
    PointerUp,
    /// Key released. Only counts when shift was held (range extension).
    KeyUp { shift: bool },
}

/// The document's selection as reported by the host at event time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSelection {
    pub text: String,
    pub anchor_offset: usize,
    pub focus_offset: usize,
    /// Caret only, nothing selected.
    pub collapsed: bool,
}

impl RawSelection {
    /// A selection covering `text`.
    ///
    /// Anchor and focus may sit in different text nodes, so equal offsets
    /// do not imply a caret; only empty text counts as collapsed.
    pub fn new(text: impl Into<String>, anchor_offset: usize, focus_offset: usize) -> Self {
        let text = text.into();
        let collapsed = text.is_empty();
        Self {
            text,
            anchor_offset,
            focus_offset,
            collapsed,
        }
    }

    pub fn collapsed_at(offset: usize) -> Self {
        Self {
            text: String::new(),
            anchor_offset: offset,
            focus_offset: offset,
            collapsed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub trigger: SelectionTrigger,
    /// `None` when the host has no selection object at all.
    pub selection: Option<RawSelection>,
}

impl SelectionEvent {
    pub fn pointer_up(selection: RawSelection) -> Self {
        Self {
            trigger: SelectionTrigger::PointerUp,
            selection: Some(selection),
        }
    }

    pub fn key_up(shift: bool, selection: RawSelection) -> Self {
        Self {
            trigger: SelectionTrigger::KeyUp { shift },
            selection: Some(selection),
        }
    }
}

/// Length bounds for captured text, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            min_chars: 10,
            max_chars: 2000,
        }
    }
}

impl From<&SelectionConfig> for SelectionLimits {
    fn from(cfg: &SelectionConfig) -> Self {
        Self {
            min_chars: cfg.min_chars,
            max_chars: cfg.max_chars,
        }
    }
}

/// Trim and bound selected text. Returns `None` when fewer than
/// `min_chars` characters remain after trimming.
pub fn normalize_selection_text(raw: &str, limits: SelectionLimits) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < limits.min_chars {
        return None;
    }
    if len > limits.max_chars {
        let mut cut: String = trimmed.chars().take(limits.max_chars).collect();
        cut.push_str(ELLIPSIS);
        return Some(cut);
    }
    Some(trimmed.to_string())
}

/// Handle returned by [`SelectionCapture::on_selection_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Option<&Selection>) + Send>;

/// Single-slot store for the most recent qualifying selection.
pub struct SelectionCapture {
    limits: SelectionLimits,
    current: Option<Selection>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl SelectionCapture {
    pub fn new(limits: SelectionLimits) -> Self {
        Self {
            limits,
            current: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn limits(&self) -> SelectionLimits {
        self.limits
    }

    /// Process one host event. Returns `true` when the slot was replaced.
    pub fn handle(&mut self, event: SelectionEvent) -> bool {
        if let SelectionTrigger::KeyUp { shift: false } = event.trigger {
            return false;
        }
        let Some(raw) = event.selection else {
            return false;
        };
        if raw.collapsed {
            return false;
        }
        let Some(text) = normalize_selection_text(&raw.text, self.limits) else {
            debug!(chars = raw.text.trim().chars().count(), "selection too short, ignored");
            return false;
        };

        debug!(chars = text.chars().count(), "selection captured");
        self.current = Some(Selection {
            text,
            start_offset: raw.anchor_offset,
            end_offset: raw.focus_offset,
        });
        self.notify();
        true
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.current.as_ref().is_some_and(|s| !s.text.is_empty())
    }

    /// Text to attach to the next request, if any.
    pub fn context_text(&self) -> Option<String> {
        self.current
            .as_ref()
            .filter(|s| !s.text.is_empty())
            .map(|s| s.text.clone())
    }

    /// Empty the slot. Listeners are only told when something was stored.
    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.notify();
        }
    }

    /// Register `callback` to run after every change of the slot.
    pub fn on_selection_change<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(Option<&Selection>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let current = self.current.as_ref();
        for (_, listener) in self.listeners.iter_mut() {
            listener(current);
        }
    }
}

impl Default for SelectionCapture {
    fn default() -> Self {
        Self::new(SelectionLimits::default())
    }
}

impl std::fmt::Debug for SelectionCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionCapture")
            .field("limits", &self.limits)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
