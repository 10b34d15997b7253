//! Session identity
//!
//! ULIDs carry a millisecond timestamp in their high bits, so lexicographic
//! order equals creation order without consulting file timestamps. A shared
//! monotonic generator keeps ids minted within the same millisecond in
//! creation order too; across process restarts the timestamp component
//! orders them.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};

use super::SessionError;

/// Chronologically sortable session identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(Ulid);

fn generator() -> &'static Mutex<Generator> {
    static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();
    GENERATOR.get_or_init(|| Mutex::new(Generator::new()))
}

impl SessionId {
    /// Mint a fresh identifier that sorts after every one minted before it
    /// in this process.
    pub fn generate() -> Self {
        let mut gen = generator()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match gen.generate() {
            Ok(ulid) => Self(ulid),
            // The generator only fails when the random component overflows
            // within a single millisecond; a fresh ulid is still unique.
            Err(_) => Self(Ulid::new()),
        }
    }

    /// Parse a user-supplied identifier. Strict ULID parsing also rejects
    /// path separators, so a resume target can never escape the sessions
    /// root.
    pub fn parse(s: &str) -> Result<Self, SessionError> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| SessionError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_sort_in_creation_order() {
        let ids: Vec<SessionId> = (0..64).map(|_| SessionId::generate()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        // String order must agree with the typed order.
        let strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let mut sorted_strings = strings.clone();
        sorted_strings.sort();
        assert_eq!(strings, sorted_strings);
    }

    #[test]
    fn parse_round_trips() {
        let id = SessionId::generate();
        let parsed = SessionId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage_and_traversal() {
        assert!(matches!(
            SessionId::parse("not-a-ulid"),
            Err(SessionError::InvalidId(_))
        ));
        assert!(SessionId::parse("../escape").is_err());
        assert!(SessionId::parse("").is_err());
    }
}
