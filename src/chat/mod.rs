//! Interactive chat loop
//! Thin glue over the settings and session stores. The model call is a
//! blocking black box between the user append and the assistant append, so
//! an interrupt leaves the log exactly as of the last completed append.

pub mod history;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use crate::provider;
use crate::session::{History, MessageEvent, Order, Session, SessionCatalog, SessionId, SessionStore};
use crate::settings::{EnvDefaults, OnboardingFlow, SettingsStore};
use self::history::InputHistory;

const TITLE_MAX_CHARS: usize = 48;

enum Flow {
    Continue,
    Quit,
}

/// Run the chat: load (or onboard) settings, open or resume a session, then
/// loop turns until the user quits.
pub async fn run(resume: Option<SessionId>) -> Result<()> {
    let settings_store = SettingsStore::new();
    let (mut settings, complete) = settings_store.load();
    if !complete {
        let stdin = io::stdin();
        let flow = OnboardingFlow::new(&settings_store, EnvDefaults::from_env());
        settings = flow.run(stdin.lock(), io::stdout())?;
    }

    let provider = provider::from_settings(&settings)
        .context("no model API key configured; run `quill onboard`")?;

    let session_store = SessionStore::new();
    let (mut session, mut events) = match resume {
        Some(id) => {
            let catalog = SessionCatalog::new(&session_store);
            let (session, history) = catalog.resume(&id)?;
            report_partial(&history);
            (session, history.events)
        }
        None => (session_store.create()?, Vec::new()),
    };

    println!("quill — type a message, /help for commands, /quit to exit");
    if !events.is_empty() {
        println!(
            "resumed \"{}\" with {} prior events",
            session.meta.title,
            events.len()
        );
    }

    let input_history = InputHistory::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            match handle_command(command, &session_store, &mut session, &mut events)? {
                Flow::Continue => continue,
                Flow::Quit => break,
            }
        }

        input_history.record(input);

        let user_event = MessageEvent::user(input);
        session_store.append(&mut session, &user_event)?;
        events.push(user_event);

        if session.meta.turn_count == 1 {
            let title = derive_title(input);
            session_store.set_title(&mut session, title)?;
        }

        match provider.complete(&events).await {
            Ok(reply) => {
                println!("\n{reply}\n");
                let event = MessageEvent::assistant(&reply);
                session_store.append(&mut session, &event)?;
                events.push(event);
            }
            Err(err) => {
                // Failed turns stay out of the log; the next prompt retries
                // with the same history.
                eprintln!("error: {err:#}");
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn handle_command(
    command: &str,
    store: &SessionStore,
    session: &mut Session,
    events: &mut Vec<MessageEvent>,
) -> Result<Flow> {
    match command.trim() {
        "quit" | "exit" => Ok(Flow::Quit),
        "help" => {
            println!("/help          show this message");
            println!("/resume        switch to a previous session");
            println!("/quit, /exit   leave the chat");
            Ok(Flow::Continue)
        }
        "resume" => {
            let catalog = SessionCatalog::new(store);
            let sessions = catalog.list(Order::NewestFirst)?;
            if sessions.is_empty() {
                println!("no sessions yet");
                return Ok(Flow::Continue);
            }
            for (index, meta) in sessions.iter().enumerate() {
                println!(
                    "{:>3}. [{}] {} ({} turns)",
                    index + 1,
                    meta.id,
                    meta.title,
                    meta.turn_count
                );
            }

            print!("session number: ");
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().lock().read_line(&mut answer)?;
            let Ok(choice) = answer.trim().parse::<usize>() else {
                println!("not a number, staying in the current session");
                return Ok(Flow::Continue);
            };
            let Some(meta) = choice.checked_sub(1).and_then(|i| sessions.get(i)) else {
                println!("no such entry, staying in the current session");
                return Ok(Flow::Continue);
            };

            let (resumed, history) = catalog.resume(&meta.id)?;
            report_partial(&history);
            println!(
                "resumed \"{}\" with {} prior events",
                resumed.meta.title,
                history.events.len()
            );
            *session = resumed;
            *events = history.events;
            Ok(Flow::Continue)
        }
        other => {
            println!("unknown command: /{other}");
            Ok(Flow::Continue)
        }
    }
}

fn report_partial(history: &History) {
    if let Some(corrupt) = &history.corrupt {
        eprintln!(
            "warning: session history is partially unreadable (line {}); continuing with {} events",
            corrupt.line,
            history.events.len()
        );
    }
}

/// Session title from the first user message: whitespace-collapsed and
/// truncated on a character boundary.
fn derive_title(input: &str) -> String {
    let flat = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= TITLE_MAX_CHARS {
        flat
    } else {
        let truncated: String = flat.chars().take(TITLE_MAX_CHARS).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_collapses_whitespace() {
        assert_eq!(derive_title("  hello\n  world "), "hello world");
    }

    #[test]
    fn title_truncates_on_char_boundary() {
        let long = "héllo ".repeat(20);
        let title = derive_title(&long);
        assert!(title.chars().count() <= TITLE_MAX_CHARS + 1);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn short_title_is_unchanged() {
        assert_eq!(derive_title("weather in lisbon"), "weather in lisbon");
    }
}
