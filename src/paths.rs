//! Filesystem layout of the quill home directory

use std::path::PathBuf;

/// Environment override for the home root, mainly for tests and sandboxes.
pub const HOME_ENV: &str = "QUILL_HOME";

/// Root for all persistent state, default `~/.quill`.
pub fn quill_home() -> PathBuf {
    if let Ok(path) = std::env::var(HOME_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    dirs::home_dir()
        .map(|h| h.join(".quill"))
        .unwrap_or_else(|| PathBuf::from(".quill"))
}

/// Directory holding one subdirectory per session.
pub fn sessions_root() -> PathBuf {
    quill_home().join("sessions")
}

/// Prompt input history shared by all sessions.
pub fn input_history_path() -> PathBuf {
    quill_home().join("history.jsonl")
}
