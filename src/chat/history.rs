//! Prompt input history
//! Best-effort JSONL record of past user prompts at the home root. Damage
//! and write failures degrade silently; input history is advisory only.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::paths;

#[derive(Debug, Serialize, Deserialize)]
struct HistoryEntry {
    timestamp: DateTime<Utc>,
    content: String,
}

pub struct InputHistory {
    path: PathBuf,
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHistory {
    pub fn new() -> Self {
        Self::with_path(paths::input_history_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Past prompts, oldest first. Unreadable lines are skipped.
    pub fn load(&self) -> Vec<String> {
        let Ok(file) = File::open(&self.path) else {
            return Vec::new();
        };

        let mut prompts = Vec::new();
        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<HistoryEntry>(&line) {
                prompts.push(entry.content);
            }
        }
        prompts
    }

    /// Record one sent prompt. Blanks and slash commands are not history.
    pub fn record(&self, prompt: &str) {
        let trimmed = prompt.trim();
        if trimmed.is_empty() || trimmed.starts_with('/') {
            return;
        }

        let entry = HistoryEntry {
            timestamp: Utc::now(),
            content: trimmed.to_string(),
        };
        if let Err(err) = self.append(&entry) {
            debug!(error = %err, "failed to record input history");
        }
    }

    fn append(&self, entry: &HistoryEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(entry)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        writeln!(file, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_and_load_round_trip_in_order() {
        let temp = TempDir::new().unwrap();
        let history = InputHistory::with_path(temp.path().join("history.jsonl"));

        history.record("first prompt");
        history.record("second prompt");

        assert_eq!(history.load(), vec!["first prompt", "second prompt"]);
    }

    #[test]
    fn commands_and_blanks_are_not_recorded() {
        let temp = TempDir::new().unwrap();
        let history = InputHistory::with_path(temp.path().join("history.jsonl"));

        history.record("/quit");
        history.record("   ");
        history.record("real prompt");

        assert_eq!(history.load(), vec!["real prompt"]);
    }

    #[test]
    fn load_tolerates_damaged_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.jsonl");
        let history = InputHistory::with_path(&path);

        history.record("good");
        std::fs::write(
            &path,
            format!("{}not json\n", std::fs::read_to_string(&path).unwrap()),
        )
        .unwrap();
        history.record("also good");

        assert_eq!(history.load(), vec!["good", "also good"]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let history = InputHistory::with_path(temp.path().join("absent.jsonl"));
        assert!(history.load().is_empty());
    }
}
