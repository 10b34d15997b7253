//! Session catalog
//! Enumerates stored sessions and composes metadata + history for resume.

use std::fs;

use tracing::{debug, warn};

use super::id::SessionId;
use super::store::{History, Session, SessionMeta, SessionStore};
use super::SessionError;

/// Presentation order for listings. Identifier order is creation order by
/// construction, so neither direction reads file timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    NewestFirst,
    OldestFirst,
}

pub struct SessionCatalog<'a> {
    store: &'a SessionStore,
}

impl<'a> SessionCatalog<'a> {
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// List every session under the root, sorted by identifier. Entries
    /// that are not readable sessions are skipped with a warning.
    pub fn list(&self, order: Order) -> Result<Vec<SessionMeta>, SessionError> {
        let root = self.store.root();
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(path = ?entry.path(), "skipping non-UTF-8 directory name");
                continue;
            };
            let id = match SessionId::parse(name) {
                Ok(id) => id,
                Err(_) => {
                    warn!(dir = %name, "skipping non-session directory");
                    continue;
                }
            };
            match self.store.metadata(&id) {
                Ok(meta) => sessions.push(meta),
                Err(err) => warn!(session_id = %id, error = %err, "skipping unreadable session"),
            }
        }

        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        if order == Order::NewestFirst {
            sessions.reverse();
        }

        debug!(count = sessions.len(), "listed sessions");
        Ok(sessions)
    }

    /// Load a session for continuation: metadata plus full history. The
    /// returned handle keeps accepting appends to the same log.
    pub fn resume(&self, id: &SessionId) -> Result<(Session, History), SessionError> {
        let meta = self.store.metadata(id)?;
        let history = self.store.load(id)?;
        Ok((Session { meta }, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MessageEvent;
    use tempfile::TempDir;

    fn create_test_store() -> (SessionStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::with_root(temp.path().join("sessions"));
        (store, temp)
    }

    #[test]
    fn list_orders_by_identifier_both_ways() {
        let (store, _temp) = create_test_store();
        let catalog = SessionCatalog::new(&store);

        let a = store.create().unwrap();
        let b = store.create().unwrap();
        let c = store.create().unwrap();

        let oldest = catalog.list(Order::OldestFirst).unwrap();
        let ids: Vec<SessionId> = oldest.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);

        let newest = catalog.list(Order::NewestFirst).unwrap();
        let ids: Vec<SessionId> = newest.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![c.id(), b.id(), a.id()]);
    }

    #[test]
    fn list_skips_stray_directories() {
        let (store, _temp) = create_test_store();
        let catalog = SessionCatalog::new(&store);

        store.create().unwrap();
        std::fs::create_dir_all(store.root().join("not-a-session")).unwrap();

        let sessions = catalog.list(Order::NewestFirst).unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn list_on_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::with_root(temp.path().join("never-created"));
        let catalog = SessionCatalog::new(&store);
        assert!(catalog.list(Order::NewestFirst).unwrap().is_empty());
    }

    #[test]
    fn resume_returns_history_and_a_live_handle() {
        let (store, _temp) = create_test_store();
        let mut session = store.create().unwrap();
        store.append(&mut session, &MessageEvent::user("hello")).unwrap();

        let catalog = SessionCatalog::new(&store);
        let (mut resumed, history) = catalog.resume(&session.id()).unwrap();
        assert_eq!(history.events.len(), 1);
        assert_eq!(resumed.meta.turn_count, 1);

        store
            .append(&mut resumed, &MessageEvent::assistant("hi"))
            .unwrap();
        assert_eq!(store.load(&session.id()).unwrap().events.len(), 2);
    }

    #[test]
    fn resume_unknown_id_is_not_found() {
        let (store, _temp) = create_test_store();
        let catalog = SessionCatalog::new(&store);
        let id = SessionId::generate();
        assert!(matches!(
            catalog.resume(&id),
            Err(SessionError::NotFound(_))
        ));
    }
}
