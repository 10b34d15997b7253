//! Session management
//! Chronologically sortable identities, the append-only per-session store,
//! and the catalog used for listing and resuming.

pub mod catalog;
pub mod id;
pub mod store;

pub use catalog::{Order, SessionCatalog};
pub use id::SessionId;
pub use store::{
    CorruptLine, History, MessageEvent, Role, Session, SessionMeta, SessionStore, ToolCall,
};

use thiserror::Error;

/// Error types for session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("invalid session id: {0}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
