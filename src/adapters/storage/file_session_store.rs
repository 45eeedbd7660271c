//! File-based Session Store Adapter
//!
//! Persists the session as a flat JSON object keyed by the storage names
//! (`userEmail`, `idToken`, `userId`, `user`). The file is loaded once on
//! open; reads are served from memory and every write replaces the file
//! through a temp file and rename, so a crash mid-write leaves either the
//! old or the new contents.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::session::SessionKey;
use crate::ports::{SessionStore, SessionStoreError};

/// File-backed session storage
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<SessionKey, String>>,
    // Serializes file writes so two updates cannot race on the temp file.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading existing contents if present.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::open(".lms-admin/session.json").await?;
    /// ```
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, SessionStoreError> {
        let path = path.as_ref().to_path_buf();
        let cache = Self::load(&path).await?;
        tracing::debug!(path = %path.display(), keys = cache.len(), "Opened session store");
        Ok(Self {
            path,
            cache: RwLock::new(cache),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<BTreeMap<SessionKey, String>, SessionStoreError> {
        if !fs::try_exists(path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?
        {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        let raw: BTreeMap<String, String> = serde_json::from_str(&json)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| match SessionKey::parse(&key) {
                Some(key) => Some((key, value)),
                None => {
                    tracing::debug!(key = %key, "Ignoring unknown session key");
                    None
                }
            })
            .collect())
    }

    async fn persist(&self, values: &BTreeMap<SessionKey, String>) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        }

        let raw: BTreeMap<&str, &String> = values.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let json = serde_json::to_string_pretty(&raw)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;

        Ok(())
    }

    /// Apply `change` to a copy of the cache, persist it, then publish it.
    async fn update<F>(&self, change: F) -> Result<(), SessionStoreError>
    where
        F: FnOnce(&mut BTreeMap<SessionKey, String>),
    {
        let _guard = self.write_lock.lock().await;

        let mut next = self.snapshot();
        change(&mut next);
        self.persist(&next).await?;

        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn snapshot(&self) -> BTreeMap<SessionKey, String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), SessionStoreError> {
        self.update(|values| {
            for (key, value) in entries {
                values.insert(*key, value.clone());
            }
        })
        .await
    }

    async fn replace_all(&self, entries: &[(SessionKey, String)]) -> Result<(), SessionStoreError> {
        self.update(|values| *values = entries.iter().cloned().collect())
            .await
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let _guard = self.write_lock.lock().await;

        // Readers stop seeing the session whatever happens to the file.
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let Err(err) = self.persist(&BTreeMap::new()).await else {
            return Ok(());
        };
        tracing::warn!(path = %self.path.display(), error = %err, "Failed to persist cleared session, removing file");
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to remove session file");
            }
        }
        Err(err)
    }
}
