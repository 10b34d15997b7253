//! Onboarding flow
//! First-run collection of settings, driven as an explicit state machine so
//! the prompt sequencing and the all-or-nothing commit can be tested with
//! scripted answers instead of a real terminal.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::info;

use super::schema::{self, FieldKind, FieldSpec, Settings, SETTINGS_FIELDS};
use super::store::SettingsStore;
use super::SettingsError;

/// How many times finalization may bounce back to credential collection
/// before the flow gives up instead of spinning on empty input.
const MAX_CREDENTIAL_ROUNDS: usize = 3;

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("onboarding cancelled")]
    Cancelled,

    #[error("no model API key was provided; at least one of Anthropic, OpenAI, or OpenRouter is required")]
    Incomplete,

    #[error(transparent)]
    Store(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Environment-derived defaults, captured once at flow construction.
/// They seed prompts only and never override a persisted value.
pub struct EnvDefaults(HashMap<&'static str, String>);

impl EnvDefaults {
    pub fn from_env() -> Self {
        let mut map = HashMap::new();
        for spec in SETTINGS_FIELDS {
            if let Ok(value) = std::env::var(spec.env) {
                let value = value.trim();
                if !value.is_empty() {
                    map.insert(spec.name, value.to_string());
                }
            }
        }
        Self(map)
    }

    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(field, value.into());
        self
    }

    fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

enum State {
    Collecting { index: usize, round: usize },
    Validating { index: usize, raw: String, round: usize },
    Finalizing { round: usize },
    Complete(Settings),
}

pub struct OnboardingFlow<'a> {
    store: &'a SettingsStore,
    defaults: EnvDefaults,
}

impl<'a> OnboardingFlow<'a> {
    pub fn new(store: &'a SettingsStore, defaults: EnvDefaults) -> Self {
        Self { store, defaults }
    }

    /// Drive the machine to completion, reading answers from `input` and
    /// writing prompts to `out`. Nothing is persisted unless finalization
    /// succeeds; a cancelled flow leaves the on-disk document untouched.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut out: W,
    ) -> Result<Settings, OnboardingError> {
        let mut draft = Settings::default();
        let mut state = State::Collecting { index: 0, round: 0 };

        writeln!(out, "Welcome to quill! Let's configure your settings.")?;
        writeln!(out, "Press Enter to skip optional fields.")?;
        writeln!(out)?;

        loop {
            state = match state {
                State::Collecting { index, round } => match SETTINGS_FIELDS.get(index) {
                    None => State::Finalizing { round },
                    // Re-collection rounds only revisit the model credentials.
                    Some(spec) if round > 0 && !schema::is_model_credential(spec.name) => {
                        State::Collecting { index: index + 1, round }
                    }
                    Some(spec) => {
                        self.prompt(&mut out, spec)?;
                        match read_answer(&mut input)? {
                            None => return Err(OnboardingError::Cancelled),
                            Some(line) => {
                                let answer = line.trim().to_string();
                                if answer.is_empty() {
                                    match self.defaults.get(spec.name) {
                                        Some(default) => State::Validating {
                                            index,
                                            raw: default.to_string(),
                                            round,
                                        },
                                        None => State::Collecting { index: index + 1, round },
                                    }
                                } else {
                                    State::Validating { index, raw: answer, round }
                                }
                            }
                        }
                    }
                },

                State::Validating { index, raw, round } => {
                    let spec = &SETTINGS_FIELDS[index];
                    match draft.apply(spec.name, &raw) {
                        Ok(()) => State::Collecting { index: index + 1, round },
                        Err(err) => {
                            writeln!(out, "Invalid value: {err}")?;
                            State::Collecting { index, round }
                        }
                    }
                }

                State::Finalizing { round } => {
                    if draft.is_complete() {
                        self.store.save(&draft)?;
                        writeln!(out)?;
                        writeln!(
                            out,
                            "Configuration complete. Settings saved to {}",
                            self.store.path().display()
                        )?;
                        info!(path = ?self.store.path(), "onboarding complete");
                        State::Complete(draft.clone())
                    } else if round + 1 >= MAX_CREDENTIAL_ROUNDS {
                        return Err(OnboardingError::Incomplete);
                    } else {
                        writeln!(out)?;
                        writeln!(
                            out,
                            "At least one model API key is required (Anthropic, OpenAI, or OpenRouter)."
                        )?;
                        State::Collecting { index: 0, round: round + 1 }
                    }
                }

                State::Complete(settings) => return Ok(settings),
            };
        }
    }

    fn prompt<W: Write>(&self, out: &mut W, spec: &FieldSpec) -> std::io::Result<()> {
        let mut text = String::from(spec.label);
        if let Some(hint) = spec.hint {
            text.push_str(&format!(" ({hint})"));
        }
        if let Some(default) = self.defaults.get(spec.name) {
            let shown = match spec.kind {
                FieldKind::Secret => schema::mask_secret(default),
                FieldKind::Integer => default.to_string(),
            };
            text.push_str(&format!(" [default: {shown}]"));
        }
        write!(out, "{text}: ")?;
        out.flush()
    }
}

/// One line from the answer source; `None` means the source is exhausted.
fn read_answer<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
