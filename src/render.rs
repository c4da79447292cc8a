//! Plain-text rendering of the widget for terminals.
//!
//! Output is line oriented so it can be piped. In right-to-left languages
//! every line starts with a RIGHT-TO-LEFT MARK, which makes bidi-aware
//! terminals lay the line out from the right.

use crate::controller::WidgetController;
use crate::language::{Labels, LanguageContext};
use crate::models::{HealthResponse, Message, Role, Selection, SourceReference};

const RLM: char = '\u{200F}';

/// Characters of the selection shown in the context banner.
pub const SELECTION_PREVIEW_CHARS: usize = 50;

fn line(out: &mut String, rtl: bool, text: &str) {
    if rtl {
        out.push(RLM);
    }
    out.push_str(text);
    out.push('\n');
}

/// `[chapter: section]` tags for the sources footer.
pub fn format_sources(sources: &[SourceReference]) -> String {
    sources
        .iter()
        .map(|s| format!("[{}: {}]", s.chapter, s.section))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_message(message: &Message, lang: LanguageContext) -> String {
    let mut out = String::new();
    let prefix = match message.role {
        Role::User => "» ",
        Role::Assistant => "  ",
    };
    for text_line in message.content.lines() {
        line(&mut out, lang.rtl, &format!("{}{}", prefix, text_line));
    }
    if message.role == Role::Assistant {
        if let Some(sources) = message.sources.as_deref().filter(|s| !s.is_empty()) {
            line(
                &mut out,
                lang.rtl,
                &format!("  {} {}", lang.labels().sources, format_sources(sources)),
            );
        }
    }
    out
}

pub fn render_selection_banner(selection: &Selection, labels: &Labels, rtl: bool) -> String {
    let mut out = String::new();
    line(
        &mut out,
        rtl,
        &format!(
            "{}: \"{}\"  ({} /clear)",
            labels.context,
            selection.preview(SELECTION_PREVIEW_CHARS),
            labels.clear
        ),
    );
    out
}

/// Everything the open panel shows, top to bottom.
///
/// A closed widget renders as an empty string.
pub fn render_panel(widget: &WidgetController) -> String {
    if !widget.is_open() {
        return String::new();
    }
    let lang = widget.language();
    let labels = lang.labels();
    let mut out = String::new();

    line(&mut out, lang.rtl, &format!("── {} ──", labels.chat_title));
    if let Some(sel) = widget.selection() {
        out.push_str(&render_selection_banner(sel, labels, lang.rtl));
    }

    let store = widget.conversation();
    if store.is_empty() {
        line(&mut out, lang.rtl, labels.greeting);
        line(&mut out, lang.rtl, labels.tip);
    } else {
        for message in store.messages() {
            out.push_str(&render_message(message, lang));
        }
    }

    if widget.is_pending() {
        line(&mut out, lang.rtl, &format!("  {}", labels.thinking));
    }
    if let Some(err) = widget.last_error() {
        line(&mut out, lang.rtl, &format!("  {}: {}", labels.error, err));
    }
    out
}

pub fn render_health(health: &HealthResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<20} {}\n", "status", health.status));
    out.push_str(&format!("{:<20} {}\n", "vector store", health.qdrant_connected));
    out.push_str(&format!("{:<20} {}\n", "collection exists", health.collection_exists));
    out.push_str(&format!("{:<20} {}\n", "indexed chunks", health.chunk_count));
    out
}
