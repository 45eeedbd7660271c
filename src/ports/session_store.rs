//! Session store port - durable key/value storage for the session.
//!
//! The store survives restarts and is the only mutable state shared
//! between the session subsystem and the rest of the client. Only the
//! orchestrator writes; anyone may read.
//!
//! Reads are synchronous and never perform I/O, so `current_session`
//! stays cheap. Writes are async and each call is atomic: readers never
//! observe half of a `set_all`.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::session::{AuthError, Session, SessionKey};

/// Errors that can occur while persisting the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize session: {0}")]
    Serialization(String),
}

impl From<SessionStoreError> for AuthError {
    fn from(err: SessionStoreError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

/// Durable, process-wide session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read one value.
    fn get(&self, key: SessionKey) -> Option<String>;

    /// Read every stored value.
    fn snapshot(&self) -> BTreeMap<SessionKey, String>;

    /// Write several values in one atomic step.
    async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), SessionStoreError>;

    /// Replace the whole contents with `entries` in one atomic step.
    async fn replace_all(&self, entries: &[(SessionKey, String)]) -> Result<(), SessionStoreError>;

    /// Remove everything.
    ///
    /// The in-memory view is emptied even when persisting fails, so a
    /// failed clear never leaves a readable session behind.
    async fn clear(&self) -> Result<(), SessionStoreError>;

    /// The stored session, if both email and token are present.
    fn session(&self) -> Option<Session> {
        let values = self.snapshot();
        Session::from_entries(|key| values.get(&key).cloned())
    }

    /// True when nothing at all is stored.
    fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
