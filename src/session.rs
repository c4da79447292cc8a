//! Interactive terminal session hosting one chat widget.
//!
//! Plays the role the documentation page plays for the browser widget:
//! lines typed at the prompt become either commands (open/close the panel,
//! select book text, switch language) or chat input. The chat request runs
//! on its own task so the session keeps reading commands while the backend
//! is working; any chat line typed in the meantime is dropped, not queued.
//!
//! | Input | Effect |
//! |-------|--------|
//! | `<text>` | send `<text>` as the next turn |
//! | `/open`, `/close`, `/toggle` | panel visibility |
//! | `/esc` | Escape key: close the panel |
//! | `/select <text>` | select `<text>` in the book |
//! | `/clear` | drop the current selection |
//! | `/lang en\|ur` | switch language |
//! | `/new` | start a new conversation |
//! | `/health` | backend readiness |
//! | `/help`, `/quit` | |

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::controller::{PendingTurn, SubmitOutcome, WidgetController};
use crate::error::ChatError;
use crate::language::Language;
use crate::models::{ChatResponse, Role};
use crate::render;
use crate::selection::{RawSelection, SelectionEvent};

/// One parsed line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Say(String),
    Open,
    Close,
    Toggle,
    Escape,
    Select(String),
    ClearSelection,
    Language(Language),
    NewConversation,
    Health,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> SessionCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return SessionCommand::Say(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "open" => SessionCommand::Open,
        "close" => SessionCommand::Close,
        "toggle" => SessionCommand::Toggle,
        "esc" | "escape" => SessionCommand::Escape,
        "select" => SessionCommand::Select(arg.to_string()),
        "clear" => SessionCommand::ClearSelection,
        "lang" => match arg.parse() {
            Ok(lang) => SessionCommand::Language(lang),
            Err(_) => SessionCommand::Unknown(trimmed.to_string()),
        },
        "new" => SessionCommand::NewConversation,
        "health" => SessionCommand::Health,
        "help" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        _ => SessionCommand::Unknown(trimmed.to_string()),
    }
}

const HELP: &str = "\
commands:
  <text>            ask a question
  /select <text>    select book text as context
  /clear            clear the selection
  /open /close /toggle /esc
  /lang en|ur       switch language
  /new              start a new conversation
  /health           backend status
  /quit";

type Reply = JoinHandle<Result<ChatResponse, ChatError>>;

/// Run the session until `/quit` or end of input.
///
/// Either way an answer already on its way is awaited and shown before
/// returning; a dispatched request is never cancelled.
///
/// `prompts` controls whether a `> ` prompt is printed; it should be off
/// when stdin is not a terminal.
pub async fn run_session(mut widget: WidgetController, prompts: bool) -> Result<()> {
    widget
        .selection_capture_mut()
        .on_selection_change(|sel| match sel {
            Some(s) => println!("[context: \"{}\"]", s.preview(render::SELECTION_PREVIEW_CHARS)),
            None => println!("[context cleared]"),
        });

    widget.open();
    print!("{}", render::render_panel(&widget));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<(PendingTurn, Reply)> = None;
    let mut input_done = false;

    loop {
        if input_done && in_flight.is_none() {
            break;
        }
        if prompts && !input_done && in_flight.is_none() {
            print!("> ");
            std::io::stdout().flush()?;
        }

        tokio::select! {
            joined = async {
                match in_flight.as_mut() {
                    Some((_, handle)) => handle.await,
                    None => std::future::pending().await,
                }
            } => {
                let Some((turn, _)) = in_flight.take() else { continue };
                let result = joined.unwrap_or_else(|e| {
                    warn!(error = %e, "chat task did not complete");
                    Err(ChatError::Interrupted(e.to_string()))
                });
                let outcome = widget.complete_submit(turn, result);
                report_outcome(&widget, outcome);
            }
            line = lines.next_line(), if !input_done => {
                let Some(line) = line? else {
                    input_done = true;
                    continue;
                };
                match parse_command(&line) {
                    SessionCommand::Quit => input_done = true,
                    SessionCommand::Say(text) => {
                        if in_flight.is_some() {
                            println!("(still waiting for the previous answer; ignored)");
                            continue;
                        }
                        if !widget.is_open() {
                            println!("(panel is closed; /open to chat)");
                            continue;
                        }
                        widget.set_input(text);
                        if let Some(turn) = widget.begin_submit() {
                            println!("  {}", widget.language().labels().thinking);
                            let client = widget.client();
                            let request = turn.request.clone();
                            let handle = tokio::spawn(async move { client.send_chat(&request).await });
                            in_flight = Some((turn, handle));
                        }
                    }
                    SessionCommand::Open => {
                        widget.open();
                        print!("{}", render::render_panel(&widget));
                    }
                    SessionCommand::Close => widget.close(),
                    SessionCommand::Escape => widget.escape(),
                    SessionCommand::Toggle => {
                        widget.toggle();
                        print!("{}", render::render_panel(&widget));
                    }
                    SessionCommand::Select(text) => {
                        let len = text.chars().count();
                        let captured = widget.handle_selection_event(SelectionEvent::pointer_up(
                            RawSelection::new(text, 0, len),
                        ));
                        if !captured {
                            println!("(selection too short; ignored)");
                        }
                    }
                    SessionCommand::ClearSelection => widget.clear_selection(),
                    SessionCommand::Language(lang) => {
                        widget.set_language(lang);
                        print!("{}", render::render_panel(&widget));
                    }
                    SessionCommand::NewConversation => {
                        if widget.new_conversation().await {
                            print!("{}", render::render_panel(&widget));
                        } else {
                            println!("(cannot reset while a request is in flight)");
                        }
                    }
                    SessionCommand::Health => match widget.client().health().await {
                        Ok(h) => print!("{}", render::render_health(&h)),
                        Err(e) => println!("health check failed: {}", e),
                    },
                    SessionCommand::Help => println!("{}", HELP),
                    SessionCommand::Unknown(cmd) => println!("unknown command: {} (try /help)", cmd),
                }
            }
        }
    }

    Ok(())
}

fn report_outcome(widget: &WidgetController, outcome: SubmitOutcome) {
    if !widget.is_open() {
        return;
    }
    let lang = widget.language();
    match outcome {
        SubmitOutcome::Answered => {
            if let Some(msg) = widget
                .conversation()
                .last()
                .filter(|m| m.role == Role::Assistant)
            {
                print!("{}", render::render_message(msg, lang));
            }
        }
        SubmitOutcome::Failed(err) => println!("  {}: {}", lang.labels().error, err),
        SubmitOutcome::Ignored => {}
    }
}
