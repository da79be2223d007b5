use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use chatlane_chat::{ChatClient, CompletionGateway, FileStore, SendOutcome};
use chatlane_llm_api::OpenRouterClient;
use chatlane_types::{ChatState, Message, Sender};

use crate::config::{load_gateway_config, resolve_data_dir};
use crate::conversation_logger::ConversationLogger;

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    List,
    Switch(String),
    Rename(String),
    Delete(Option<String>),
    History,
    Help,
    Quit,
    Send(String),
    Invalid(String),
}

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line == "exit" || line == "quit" {
        return ReplCommand::Quit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Send(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name, arg) {
        ("new", _) => ReplCommand::New,
        ("list", _) => ReplCommand::List,
        ("history", _) => ReplCommand::History,
        ("help", _) => ReplCommand::Help,
        ("quit" | "exit", _) => ReplCommand::Quit,
        ("delete", "") => ReplCommand::Delete(None),
        ("delete", id) => ReplCommand::Delete(Some(id.to_string())),
        ("switch", "") => ReplCommand::Invalid("usage: /switch <id>".to_string()),
        ("switch", id) => ReplCommand::Switch(id.to_string()),
        ("rename", title) => ReplCommand::Rename(title.to_string()),
        _ => ReplCommand::Invalid(format!("unknown command /{}; try /help", name)),
    }
}

/// Run interactive REPL mode
pub async fn run_repl_mode(
    data_dir: Option<PathBuf>,
    transcript: Option<PathBuf>,
    session: Option<String>,
) -> Result<()> {
    let data_dir = resolve_data_dir(data_dir.as_deref())?;
    let storage = FileStore::open(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    let gateway = OpenRouterClient::new(load_gateway_config()?)
        .context("Failed to build the completion client")?;
    let model = gateway.config().model.clone();
    let client = ChatClient::new(Box::new(storage), gateway);

    if let Some(id) = session {
        if !client.select_session(&id) {
            eprintln!("{} Unknown session {}, staying in {}", "⚠️".yellow(), id, client.active_session_id());
        }
    }

    let mut logger = match transcript {
        Some(path) => match ConversationLogger::open(&path).await {
            Ok(logger) => Some(logger),
            Err(e) => {
                eprintln!("Transcript disabled: {:#}", e);
                None
            }
        },
        None => None,
    };

    println!("{}", "💬 Chatlane".bright_cyan().bold());
    println!(
        "{}",
        format!("Data: {} • Model: {}", data_dir.display(), model).bright_black()
    );
    println!("{}", "Type /help for commands, 'exit' or 'quit' to exit\n".bright_black());
    print_history(&client.snapshot());

    let mut rl = DefaultEditor::new()?;

    loop {
        let snapshot = client.snapshot();
        let title = snapshot
            .active_session()
            .map(|s| s.title.clone())
            .unwrap_or_default();
        let prompt = format!("{} {} ", format!("[{}]", title).bright_magenta(), "You:".bright_green().bold());

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let command = parse_command(&line);
                if run_command(&client, logger.as_mut(), command).await == Flow::Quit {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C (type 'exit' to quit)".bright_yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_cyan());
                break;
            }
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

/// Apply one command to the client, printing its result
pub async fn run_command<G: CompletionGateway>(
    client: &ChatClient<G>,
    logger: Option<&mut ConversationLogger>,
    command: ReplCommand,
) -> Flow {
    match command {
        ReplCommand::Quit => return Flow::Quit,
        ReplCommand::Help => print_help(),
        ReplCommand::New => {
            let id = client.create_session();
            println!("{} {}", "✨ Started session".green(), id);
            print_history(&client.snapshot());
        }
        ReplCommand::List => print_sessions(client),
        ReplCommand::Switch(id) => {
            if client.select_session(&id) {
                print_history(&client.snapshot());
            } else {
                eprintln!("{} No session {}", "❌".bright_red(), id);
            }
        }
        ReplCommand::Rename(title) => {
            let id = client.active_session_id();
            match client.rename_session(&id, &title) {
                Ok(()) => println!("{} {}", "✏️  Renamed session".green(), id),
                Err(e) => eprintln!("{} {}", "❌".bright_red(), e),
            }
        }
        ReplCommand::Delete(id) => {
            let id = id.unwrap_or_else(|| client.active_session_id());
            match client.delete_session(&id) {
                Ok(()) => {
                    println!("{} {}", "🗑️  Deleted session".green(), id);
                    print_history(&client.snapshot());
                }
                Err(e) => eprintln!("{} {}", "❌".bright_red(), e),
            }
        }
        ReplCommand::History => print_history(&client.snapshot()),
        ReplCommand::Invalid(message) => eprintln!("{} {}", "⚠️".yellow(), message),
        ReplCommand::Send(text) => send(client, logger, &text).await,
    }
    Flow::Continue
}

async fn send<G: CompletionGateway>(
    client: &ChatClient<G>,
    logger: Option<&mut ConversationLogger>,
    text: &str,
) {
    let session_id = client.active_session_id();
    let mut pending = match client.begin_submit_to(&session_id, text) {
        Ok(pending) => pending,
        Err(e) => {
            eprintln!("{} {}", "⚠️".yellow(), e);
            return;
        }
    };
    let user_message_id = pending.user_message_id();
    let result = client.gateway().send(pending.take_context()).await;
    if pending.resolve(result) == SendOutcome::Discarded {
        eprintln!("{} Session {} was deleted before the reply arrived", "⚠️".yellow(), session_id);
        return;
    }

    let snapshot = client.snapshot();
    let Some(session) = snapshot.session(&session_id) else {
        return;
    };
    let appended: Vec<&Message> = session
        .messages
        .iter()
        .filter(|m| m.id >= user_message_id)
        .collect();

    for message in appended.iter().filter(|m| m.sender == Sender::Bot) {
        print_message(message);
    }
    if let Some(logger) = logger {
        for message in appended {
            logger.log(&session_id, message).await;
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_cyan());
    for (usage, description) in [
        ("/new", "start a new session"),
        ("/list", "list sessions"),
        ("/switch <id>", "make another session active"),
        ("/rename <title>", "rename the active session"),
        ("/delete [id]", "delete a session (default: the active one)"),
        ("/history", "show the active session"),
        ("/quit", "exit"),
    ] {
        println!("  {:<18} {}", usage.bright_white(), description.bright_black());
    }
}

fn print_sessions<G: CompletionGateway>(client: &ChatClient<G>) {
    let snapshot = client.snapshot();
    for session in &snapshot.sessions {
        let marker = if session.id == snapshot.active_session_id { "*" } else { " " };
        let pending = if client.is_pending(&session.id) { " (waiting)" } else { "" };
        println!(
            "{} {:<16} {} {}{}",
            marker.bright_green(),
            session.id,
            session.title.bold(),
            format!("[{} messages]", session.messages.len()).bright_black(),
            pending.yellow()
        );
    }
}

fn print_history(state: &ChatState) {
    let Some(session) = state.active_session() else {
        return;
    };
    println!("{}", format!("── {} ({}) ──", session.title, session.id).bright_black());
    for message in &session.messages {
        print_message(message);
    }
}

fn print_message(message: &Message) {
    let time = message.timestamp.format("%H:%M").to_string().bright_black();
    match message.sender {
        Sender::User => println!("{} {} {}", time, "You:".bright_green().bold(), message.text),
        Sender::Bot if message.error => {
            let kind = message.error_kind.map(|k| k.as_str()).unwrap_or("error");
            println!(
                "{} {} {} {}",
                time,
                "Bot:".bright_blue().bold(),
                message.text.bright_red(),
                format!("({})", kind).bright_black()
            );
        }
        Sender::Bot => println!("{} {} {}", time, "Bot:".bright_blue().bold(), message.text),
    }
}
