//! In-Memory Session Store Adapter
//!
//! Keeps the session in process memory. Useful for tests and for
//! embedding where persistence is handled elsewhere.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::session::SessionKey;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory session storage
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: RwLock<BTreeMap<SessionKey, String>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with values (useful for tests)
    pub fn with_entries(entries: &[(SessionKey, &str)]) -> Self {
        let values = entries
            .iter()
            .map(|(key, value)| (*key, value.to_string()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn snapshot(&self) -> BTreeMap<SessionKey, String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), SessionStoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            values.insert(*key, value.clone());
        }
        Ok(())
    }

    async fn replace_all(&self, entries: &[(SessionKey, String)]) -> Result<(), SessionStoreError> {
        *self.values.write().unwrap_or_else(PoisonError::into_inner) =
            entries.iter().cloned().collect();
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
