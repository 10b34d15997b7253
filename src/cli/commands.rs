//! CLI commands

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::chat;
use crate::session::{Order, SessionCatalog, SessionId, SessionStore};
use crate::settings::{EnvDefaults, OnboardingFlow, SettingsStore};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Local CLI conversational assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat (the default when no command is given)
    Chat {
        /// Resume an existing session by id
        #[arg(long)]
        resume: Option<String>,
    },

    /// Resume a session by id
    Resume {
        /// Session ID
        session_id: String,
    },

    /// Run the onboarding flow to (re)configure settings
    Onboard,

    /// Inspect or modify settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// List saved sessions
    Sessions {
        /// Oldest first instead of newest first
        #[arg(long)]
        oldest_first: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show all settings with secrets masked
    Show,

    /// Print one field's value
    Get { field: String },

    /// Set one field
    Set { field: String, value: String },

    /// Clear all settings; the next run triggers onboarding
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Runtime for the provider boundary; everything else is synchronous
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Commands::Chat { resume: None }) {
        Commands::Chat { resume } => {
            let resume = resume.map(|raw| SessionId::parse(&raw)).transpose()?;
            rt.block_on(chat::run(resume))
        }

        Commands::Resume { session_id } => {
            let id = SessionId::parse(&session_id)?;
            rt.block_on(chat::run(Some(id)))
        }

        Commands::Onboard => {
            let store = SettingsStore::new();
            let flow = OnboardingFlow::new(&store, EnvDefaults::from_env());
            let stdin = std::io::stdin();
            flow.run(stdin.lock(), std::io::stdout())?;
            Ok(())
        }

        Commands::Settings { action } => run_settings(action),

        Commands::Sessions { oldest_first } => {
            let store = SessionStore::new();
            let catalog = SessionCatalog::new(&store);
            let order = if oldest_first {
                Order::OldestFirst
            } else {
                Order::NewestFirst
            };

            let sessions = catalog.list(order)?;
            if sessions.is_empty() {
                println!("No sessions found");
            } else {
                for meta in sessions {
                    println!(
                        "[{}] {} - {} turns - updated {}",
                        meta.id,
                        meta.title,
                        meta.turn_count,
                        meta.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
            Ok(())
        }
    }
}

fn run_settings(action: SettingsAction) -> Result<()> {
    let store = SettingsStore::new();

    match action {
        SettingsAction::Show => {
            let (settings, complete) = store.load();
            println!("Settings ({})", store.path().display());
            for (name, value) in settings.display_rows() {
                let shown = if value.is_empty() {
                    "(not set)".to_string()
                } else {
                    value
                };
                println!("  {name:<20} {shown}");
            }
            if !complete {
                println!();
                println!("Incomplete: set at least one model API key or run `quill onboard`.");
            }
            Ok(())
        }

        SettingsAction::Get { field } => {
            println!("{}", store.get(&field)?);
            Ok(())
        }

        SettingsAction::Set { field, value } => {
            store.set(&field, &value)?;
            println!("Updated {field}");
            Ok(())
        }

        SettingsAction::Reset { yes } => {
            if !yes {
                let prompt = format!("Reset all settings in {}? [y/N] ", store.path().display());
                if !confirm(&prompt)? {
                    println!("Reset cancelled");
                    return Ok(());
                }
            }
            store.reset()?;
            println!("Settings reset; the next run will start onboarding.");
            Ok(())
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
