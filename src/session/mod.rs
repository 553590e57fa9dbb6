//! Session module
//!
//! Resolves the current actor of a request from an opaque session token.
//! The ledger never looks at sessions itself; callers resolve the actor
//! here and pass the account id in explicitly.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::AccountId;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

const TOKEN_BYTES: usize = 32;

/// Source of the current actor for a request.
///
/// This is the entry point for library callers that hold a token and need
/// the account id to pass into the transfer engine. The HTTP session
/// middleware calls [`SessionStore::validate`] instead, because it answers
/// an expired token with its own error.
pub trait SessionProvider: Send + Sync {
    /// Account behind `token`, or `None` when there is no live session
    fn resolve_current_actor(&self, token: &str) -> Option<AccountId>;
}

/// An issued session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: String,
    pub account_id: AccountId,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.issued_at + ttl
    }
}

/// Outcome of a session check
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Valid(Session),
    Expired,
    Missing,
}

/// In-memory session table
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `account_id`
    pub fn issue(&self, account_id: AccountId) -> Session {
        self.issue_at(account_id, Utc::now())
    }

    fn issue_at(&self, account_id: AccountId, issued_at: DateTime<Utc>) -> Session {
        let session = Session {
            token: new_token(),
            account_id,
            issued_at,
        };
        self.sessions
            .write()
            .insert(session.token.clone(), session.clone());

        tracing::debug!(account_id = %account_id, "Session issued");
        session
    }

    /// Check `token`, dropping it when it has expired
    pub fn validate(&self, token: &str) -> SessionStatus {
        self.validate_at(token, Utc::now())
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> SessionStatus {
        let session = match self.sessions.read().get(token) {
            Some(session) => session.clone(),
            None => return SessionStatus::Missing,
        };

        if session.expires_at(self.ttl) <= now {
            self.sessions.write().remove(token);
            tracing::debug!(account_id = %session.account_id, "Session expired");
            return SessionStatus::Expired;
        }
        SessionStatus::Valid(session)
    }

    /// End a session (logout). Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at(ttl) > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

impl SessionProvider for SessionStore {
    fn resolve_current_actor(&self, token: &str) -> Option<AccountId> {
        match self.validate(token) {
            SessionStatus::Valid(session) => Some(session.account_id),
            SessionStatus::Expired | SessionStatus::Missing => None,
        }
    }
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_issue_and_resolve() {
        let store = SessionStore::default();
        let account_id = Uuid::new_v4();

        let session = store.issue(account_id);

        assert_eq!(session.token.len(), TOKEN_BYTES * 2);
        assert_eq!(store.resolve_current_actor(&session.token), Some(account_id));
        assert_eq!(store.resolve_current_actor("unknown"), None);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = SessionStore::default();
        let account_id = Uuid::new_v4();

        let a = store.issue(account_id);
        let b = store.issue(account_id);

        assert_ne!(a.token, b.token);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_expired_session_removed_on_validate() {
        let store = SessionStore::new(Duration::hours(1));
        let issued_at = Utc::now() - Duration::hours(2);
        let session = store.issue_at(Uuid::new_v4(), issued_at);

        assert_eq!(store.validate(&session.token), SessionStatus::Expired);
        assert_eq!(store.validate(&session.token), SessionStatus::Missing);
        assert!(store.is_empty());
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::default();
        let session = store.issue(Uuid::new_v4());

        assert!(store.revoke(&session.token));
        assert!(!store.revoke(&session.token));
        assert_eq!(store.resolve_current_actor(&session.token), None);
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(Duration::hours(1));
        let now = Utc::now();
        store.issue_at(Uuid::new_v4(), now - Duration::hours(3));
        store.issue_at(Uuid::new_v4(), now - Duration::minutes(90));
        let live = store.issue_at(Uuid::new_v4(), now);

        assert_eq!(store.purge_expired_at(now), 2);
        assert_eq!(store.len(), 1);
        assert!(matches!(store.validate_at(&live.token, now), SessionStatus::Valid(_)));
    }
}
