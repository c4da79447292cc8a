//! # book-chat
//!
//! Client-side core of the textbook assistant: the chat widget's
//! conversation state, text-selection context, and the HTTP client for the
//! retrieval-augmented-generation backend that answers questions about the
//! book.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  selected text   ┌──────────────────┐  ChatRequest  ┌───────────┐
//! │ Selection  │─────────────────▶│ WidgetController │──────────────▶│ ChatApi   │──▶ RAG backend
//! │ Capture    │                  │ open/close/send  │◀──────────────│ (HTTP)    │
//! └────────────┘                  └────────┬─────────┘  ChatResponse └───────────┘
//!                                          ▼
//!                                 ┌──────────────────┐
//!                                 │ ConversationStore│──▶ render
//!                                 └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! bookchat health                                  # is the backend up?
//! bookchat ask "What is embodied intelligence?"
//! bookchat ask "Explain this" --selection "Passive dynamic walkers ..."
//! bookchat --language ur chat                      # interactive, right-to-left
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire and domain data types |
//! | [`language`] | UI language, RTL flag, display labels |
//! | [`access`] | Access gate consulted at mount time |
//! | [`error`] | Client error taxonomy |
//! | [`selection`] | Text-selection capture |
//! | [`conversation`] | Conversation transcript store |
//! | [`client`] | Backend HTTP client |
//! | [`controller`] | Widget state machine |
//! | [`render`] | Terminal rendering |
//! | [`session`] | Interactive terminal session |

pub mod access;
pub mod client;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod language;
pub mod models;
pub mod render;
pub mod selection;
pub mod session;
