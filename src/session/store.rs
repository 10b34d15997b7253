//! Session store
//!
//! One directory per session under the sessions root: an append-only
//! `history.jsonl` event log plus a `session.json` metadata sidecar. The
//! log is only ever appended to and each append is flushed durably; the
//! sidecar is rewritten atomically after every append, so a crash between
//! appends can lose at most the in-flight event.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::id::SessionId;
use super::SessionError;
use crate::paths;

pub const HISTORY_FILE: &str = "history.jsonl";
pub const META_FILE: &str = "session.json";

const DEFAULT_TITLE: &str = "New session";

/// Role of a conversation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// Structured record of one tool invocation attached to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One immutable conversation record, stored as one JSONL line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl MessageEvent {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_calls: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// Mutable sidecar record, rewritten after every append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turn_count: u64,
    pub title: String,
}

/// Handle to a live session.
#[derive(Debug, Clone)]
pub struct Session {
    pub meta: SessionMeta,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.meta.id
    }
}

/// Where a history read stopped parsing.
#[derive(Debug, Clone)]
pub struct CorruptLine {
    pub line: usize,
    pub reason: String,
}

/// Result of reading a session log. A corrupt tail degrades the read to the
/// parsable prefix instead of failing it.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub events: Vec<MessageEvent>,
    pub corrupt: Option<CorruptLine>,
}

impl History {
    pub fn is_partial(&self) -> bool {
        self.corrupt.is_some()
    }
}

pub struct SessionStore {
    root: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Store rooted at the default sessions directory.
    pub fn new() -> Self {
        Self::with_root(paths::sessions_root())
    }

    /// Store rooted at a custom directory, used by tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Deterministic directory for a session id.
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn history_path(&self, id: &SessionId) -> PathBuf {
        self.path_for(id).join(HISTORY_FILE)
    }

    fn meta_path(&self, id: &SessionId) -> PathBuf {
        self.path_for(id).join(META_FILE)
    }

    /// Allocate a new session: directory, empty log, metadata at turn 0.
    pub fn create(&self) -> Result<Session, SessionError> {
        let id = SessionId::generate();
        fs::create_dir_all(self.path_for(&id))?;

        File::create(self.history_path(&id))?;

        let now = Utc::now();
        let meta = SessionMeta {
            id,
            created_at: now,
            updated_at: now,
            turn_count: 0,
            title: DEFAULT_TITLE.to_string(),
        };
        self.write_meta(&meta)?;

        info!(session_id = %id, "created session");
        Ok(Session { meta })
    }

    /// Append one event to the log, durably, then refresh the sidecar.
    /// Events land on disk in exactly the order this is called.
    pub fn append(&self, session: &mut Session, event: &MessageEvent) -> Result<(), SessionError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.history_path(&session.meta.id))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, event)?;
        writeln!(writer)?;
        writer.flush()?;
        writer.get_ref().sync_data()?;

        session.meta.turn_count += 1;
        session.meta.updated_at = Utc::now();
        self.write_meta(&session.meta)?;

        debug!(session_id = %session.meta.id, turn = session.meta.turn_count, role = %event.role, "appended event");
        Ok(())
    }

    /// Read the full history in file order.
    ///
    /// The first unparsable line stops the read; everything before it is
    /// returned and the damage is reported in `History::corrupt` rather
    /// than as an error, so a torn tail write never hides prior events.
    pub fn load(&self, id: &SessionId) -> Result<History, SessionError> {
        if !self.path_for(id).exists() {
            return Err(SessionError::NotFound(id.to_string()));
        }

        let path = self.history_path(id);
        if !path.exists() {
            return Ok(History::default());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut history = History::default();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MessageEvent>(&line) {
                Ok(event) => history.events.push(event),
                Err(err) => {
                    warn!(
                        session_id = %id,
                        line = line_number,
                        error = %err,
                        "corrupt history line, keeping events before it"
                    );
                    history.corrupt = Some(CorruptLine {
                        line: line_number,
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }

        Ok(history)
    }

    /// Read the metadata sidecar.
    pub fn metadata(&self, id: &SessionId) -> Result<SessionMeta, SessionError> {
        let path = self.meta_path(id);
        if !path.exists() {
            return Err(SessionError::NotFound(id.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the session title; metadata-only, the log is untouched.
    pub fn set_title(
        &self,
        session: &mut Session,
        title: impl Into<String>,
    ) -> Result<(), SessionError> {
        session.meta.title = title.into();
        session.meta.updated_at = Utc::now();
        self.write_meta(&session.meta)
    }

    /// Atomic sidecar rewrite: temp sibling, then rename into place.
    fn write_meta(&self, meta: &SessionMeta) -> Result<(), SessionError> {
        let path = self.meta_path(&meta.id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(meta)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
