//! # Textbook assistant CLI (`bookchat`)
//!
//! Terminal front end for the textbook assistant's chat widget. It mounts
//! the same controller the page embeds and talks to the same RAG backend.
//!
//! ## Usage
//!
//! ```bash
//! bookchat --config ./config/bookchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bookchat ask "<query>"` | Ask one question and print the answer with sources |
//! | `bookchat chat` | Interactive session (panel, selections, language switch) |
//! | `bookchat health` | Backend readiness |
//! | `bookchat conversations list` | Conversations the backend remembers |
//! | `bookchat conversations clear <id>` | Make the backend forget a conversation |
//! | `bookchat completions <shell>` | Print a shell completion script |
//!
//! The backend URL comes from `BOOKCHAT_API_URL`, then `[backend].base_url`,
//! then `http://localhost:8000`. Logs go to stderr; set `RUST_LOG=debug` to
//! see each turn.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use book_chat::access::OpenAccess;
use book_chat::client::{ChatApi, HttpChatClient};
use book_chat::config::{self, Config};
use book_chat::controller::{SubmitOutcome, WidgetController};
use book_chat::language::{Language, LanguageContext};
use book_chat::models::{ChatResponse, Role};
use book_chat::render;
use book_chat::selection::{RawSelection, SelectionEvent, SelectionLimits};
use book_chat::session;

/// Textbook assistant — ask the book's RAG backend questions from the terminal.
#[derive(Parser)]
#[command(
    name = "bookchat",
    about = "Textbook assistant — chat with the book's RAG backend",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/bookchat.toml`. Built-in defaults are used
    /// when the file does not exist.
    #[arg(long, global = true, default_value = "./config/bookchat.toml")]
    config: PathBuf,

    /// Answer language (`en` or `ur`). Overrides `[widget].language`.
    #[arg(long, global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question.
    Ask {
        /// The question.
        query: String,

        /// Book text to use as context for the question.
        #[arg(long)]
        selection: Option<String>,

        /// Continue a conversation started earlier.
        #[arg(long)]
        conversation: Option<String>,

        /// Print the backend response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Open an interactive chat session.
    Chat,

    /// Show backend readiness.
    Health {
        /// Print the raw health response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage conversations remembered by the backend.
    Conversations {
        #[command(subcommand)]
        action: ConversationAction,
    },

    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConversationAction {
    /// List conversation ids.
    List,
    /// Forget one conversation.
    Clear {
        /// Conversation id.
        id: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(
            *shell,
            &mut Cli::command(),
            "bookchat",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;
    let language = cli.language.unwrap_or(cfg.widget.language);
    let client: Arc<dyn ChatApi> = Arc::new(
        HttpChatClient::from_config(&cfg).context("Failed to create backend client")?,
    );

    match cli.command {
        Commands::Ask {
            query,
            selection,
            conversation,
            json,
        } => {
            run_ask(&cfg, client, language, query, selection, conversation, json).await?;
        }
        Commands::Chat => {
            let widget = mount(&cfg, client, language)?;
            session::run_session(widget, atty::is(atty::Stream::Stdin)).await?;
        }
        Commands::Health { json } => {
            let health = client.health().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                print!("{}", render::render_health(&health));
            }
        }
        Commands::Conversations { action } => match action {
            ConversationAction::List => {
                let list = client.list_conversations().await?;
                for id in &list.conversations {
                    println!("{}", id);
                }
                println!("{} active conversation(s)", list.count);
            }
            ConversationAction::Clear { id } => {
                let resp = client.clear_conversation(&id).await?;
                if !resp.success {
                    anyhow::bail!("{}", resp.message);
                }
                println!("{}", resp.message);
            }
        },
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

fn mount(
    cfg: &Config,
    client: Arc<dyn ChatApi>,
    language: Language,
) -> anyhow::Result<WidgetController> {
    Ok(WidgetController::mount(
        client,
        LanguageContext::new(language),
        SelectionLimits::from(&cfg.selection),
        &OpenAccess,
    )?)
}

async fn run_ask(
    cfg: &Config,
    client: Arc<dyn ChatApi>,
    language: Language,
    query: String,
    selection: Option<String>,
    conversation: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut widget = mount(cfg, client, language)?;
    widget.open();

    if let Some(text) = selection {
        let len = text.chars().count();
        if !widget.handle_selection_event(SelectionEvent::pointer_up(RawSelection::new(
            text, 0, len,
        ))) {
            eprintln!(
                "Warning: selection shorter than {} characters, sending without context",
                cfg.selection.min_chars
            );
        }
    }
    if let Some(id) = conversation {
        widget.resume_conversation(id);
    }

    widget.set_input(query);
    match widget.submit().await {
        SubmitOutcome::Answered => {}
        SubmitOutcome::Failed(message) => anyhow::bail!("{}", message),
        SubmitOutcome::Ignored => anyhow::bail!("query must not be empty"),
    }

    let Some(answer) = widget
        .conversation()
        .last()
        .filter(|m| m.role == Role::Assistant)
    else {
        anyhow::bail!("no answer recorded");
    };
    let conversation_id = widget.conversation_id().unwrap_or_default().to_string();

    if json {
        let response = ChatResponse {
            answer: answer.content.clone(),
            sources: answer.sources.clone().unwrap_or_default(),
            grounded: answer.grounded.unwrap_or(false),
            conversation_id,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render::render_message(answer, widget.language()));
        println!("conversation: {}", conversation_id);
    }
    Ok(())
}
