use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use termpal_core::chat::{Chat, ChatRepository, ChatsManager, MessageRole};
use termpal_core::clock::{Clock, SystemClock};
use termpal_infrastructure::{Config, DirChatRepository, TermpalPaths};

mod responder;

use responder::{GeminiResponder, Responder, RuleBasedResponder};

#[derive(Parser)]
#[command(name = "termpal", version)]
#[command(about = "termpal - a terminal assistant with durable, file-backed chats", long_about = None)]
struct Cli {
    /// Override the data directory (default: ~/.termpal)
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints
/// for the slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/new".to_string(),
                "/chats".to_string(),
                "/switch".to_string(),
                "/delete".to_string(),
                "/quit".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// The main entry point for the termpal REPL.
///
/// Sets up logging, loads the configuration, constructs the chat manager
/// over the directory-backed repository, picks a responder backend, and
/// runs the readline loop.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "termpal=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => {
            TermpalPaths::base_dir().context("Failed to resolve the termpal base directory")?
        }
    };

    let config = Config::load_or_create(&base_dir);
    let repository: Arc<dyn ChatRepository> = Arc::new(DirChatRepository::new(&base_dir));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut manager = ChatsManager::new(repository, clock);

    let responder: Box<dyn Responder> = match config.gemini_key.clone() {
        Some(key) => Box::new(GeminiResponder::new(key, config.model.clone())),
        None => {
            println!(
                "{}",
                "No gemini_key configured; using the offline responder.".yellow()
            );
            Box::new(RuleBasedResponder::new(Some(base_dir.join("workflows"))))
        }
    };

    run_repl(&mut manager, responder.as_ref()).await
}

async fn run_repl(manager: &mut ChatsManager, responder: &dyn Responder) -> Result<()> {
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== termpal ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, '/chats' to list chats, '/quit' to exit.".bright_black()
    );
    println!();

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed.starts_with('/') {
                    if handle_command(manager, trimmed) {
                        break;
                    }
                    continue;
                }

                chat_turn(manager, responder, trimmed).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

/// Runs one user utterance through the current chat and the responder.
///
/// A responder failure is shown to the user and no assistant message is
/// written; the user message stays recorded.
async fn chat_turn(manager: &mut ChatsManager, responder: &dyn Responder, input: &str) {
    let chat_id = match manager.current_chat_id() {
        Some(id) => id.to_string(),
        None => manager.create_new_chat().id,
    };

    manager.add_message(&chat_id, MessageRole::User, input);

    match responder.respond(input).await {
        Ok(reply) => {
            manager.add_message(&chat_id, MessageRole::Assistant, &reply);
            for line in reply.lines() {
                println!("{}", line.bright_blue());
            }
        }
        Err(e) => {
            eprintln!("{}", format!("Responder failed: {:#}", e).red());
        }
    }
}

/// Handles a slash command. Returns `true` when the REPL should exit.
fn handle_command(manager: &mut ChatsManager, input: &str) -> bool {
    let mut parts = input.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().map(str::trim).unwrap_or_default();

    match command {
        "/quit" => {
            println!("{}", "Goodbye!".bright_green());
            return true;
        }
        "/new" => {
            let chat = manager.create_new_chat();
            println!("{}", format!("Started chat {}", chat.id).green());
        }
        "/chats" => {
            let chats = manager.chats();
            if chats.is_empty() {
                println!("{}", "No chats yet.".bright_black());
            }
            for chat in &chats {
                print_chat_line(chat, manager.current_chat_id() == Some(chat.id.as_str()));
            }
        }
        "/switch" => {
            if argument.is_empty() {
                println!("{}", "Usage: /switch <chat-id>".yellow());
            } else if manager.chats().iter().any(|c| c.id == argument) {
                manager.set_current_chat(argument);
                println!("{}", format!("Switched to chat {}", argument).green());
            } else {
                println!("{}", format!("No chat with id {}", argument).yellow());
            }
        }
        "/delete" => {
            if argument.is_empty() {
                println!("{}", "Usage: /delete <chat-id>".yellow());
            } else if manager.chats().iter().any(|c| c.id == argument) {
                manager.delete_chat(argument);
                println!("{}", format!("Deleted chat {}", argument).green());
            } else {
                println!("{}", format!("No chat with id {}", argument).yellow());
            }
        }
        _ => {
            println!("{}", "Unknown command".bright_black());
        }
    }

    false
}

fn print_chat_line(chat: &Chat, is_current: bool) {
    let marker = if is_current { "*" } else { " " };
    let line = format!(
        "{} {}  {}  ({} messages, updated {})",
        marker,
        chat.id,
        chat.title,
        chat.messages.len(),
        chat.updated_at.format("%Y-%m-%d %H:%M")
    );
    if is_current {
        println!("{}", line.bright_cyan());
    } else {
        println!("{}", line);
    }
}
