//! Per-user session table.

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use parley_rs_protocol::{DEFAULT_DISPLAY_NAME, UserId};
use std::collections::HashMap;
use std::sync::Arc;

/// Ephemeral per-user counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub message_count: u64,
}

impl Session {
    fn new(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            created_at: Utc::now(),
            message_count: 0,
        }
    }
}

/// Sessions keyed by user id. Entries live for the whole process.
#[derive(Debug, Default, Clone)]
pub struct SessionTable {
    sessions: Arc<RwLock<HashMap<UserId, Session>>>,
}

impl SessionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the user's session, creating it with a zero count if needed.
    pub fn touch(&self, user_id: &str, display_name: &str) -> Session {
        if let Some(session) = self.sessions.read().get(user_id) {
            return session.clone();
        }
        let mut sessions = self.sessions.write();
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!("created session (user_id={})", user_id);
                Session::new(user_id, display_name)
            })
            .clone()
    }

    /// Bump the user's message count, creating the session first if absent.
    pub fn increment(&self, user_id: &str) -> Session {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id, DEFAULT_DISPLAY_NAME));
        session.message_count += 1;
        session.clone()
    }

    /// Snapshot of the user's session, if one exists.
    pub fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.read().get(user_id).cloned()
    }

    /// Number of distinct users seen.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of message counts across all sessions.
    pub fn total_messages(&self) -> u64 {
        self.sessions
            .read()
            .values()
            .map(|session| session.message_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::SessionTable;
    use parley_rs_protocol::DEFAULT_DISPLAY_NAME;
    use pretty_assertions::assert_eq;

    #[test]
    fn touch_creates_once_and_keeps_first_name() {
        let table = SessionTable::new();
        let first = table.touch("1", "Ada");
        assert_eq!(first.message_count, 0);
        let again = table.touch("1", "Someone Else");
        assert_eq!(again.display_name, "Ada");
        assert_eq!(again.created_at, first.created_at);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn increment_creates_missing_sessions() {
        let table = SessionTable::new();
        let session = table.increment("9");
        assert_eq!(session.message_count, 1);
        assert_eq!(session.display_name, DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn totals_span_all_users() {
        let table = SessionTable::new();
        table.touch("a", "A");
        table.increment("a");
        table.increment("a");
        table.increment("b");
        assert_eq!(table.total_messages(), 3);
        assert_eq!(table.get("a").map(|s| s.message_count), Some(2));
    }
}
