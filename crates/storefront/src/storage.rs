//! Per-profile local storage.
//!
//! The browser-local-storage stand-in: a flat string-to-string map held in
//! memory and mirrored to a single JSON file. Every mutation rewrites the
//! whole file, so concurrent processes sharing a profile behave like
//! browser tabs sharing an origin - last write wins, best effort.
//!
//! A record that fails to parse is treated as absent, never propagated:
//! callers ask for typed values with [`LocalStorage::get`] and receive
//! `None` for corrupt entries.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while persisting the storage file.
///
/// Read-side problems (missing file, corrupt records) are absorbed as
/// absence and never surface here.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage file could not be written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A per-profile key-value store.
///
/// Cheaply cloneable; all clones share the same map and backing file.
#[derive(Clone)]
pub struct LocalStorage {
    inner: Arc<Mutex<StorageInner>>,
}

struct StorageInner {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl LocalStorage {
    /// Open the storage file at `path`, creating an empty store if the file
    /// does not exist. An unreadable or corrupt file is logged and treated
    /// as empty rather than failing startup.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("storage file {} is corrupt, starting empty: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("storage file {} is unreadable, starting empty: {e}", path.display());
                BTreeMap::new()
            }
        };

        Self {
            inner: Arc::new(Mutex::new(StorageInner {
                entries,
                path: Some(path),
            })),
        }
    }

    /// Create a store with no backing file. Used by tests and ephemeral
    /// consumers.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StorageInner {
                entries: BTreeMap::new(),
                path: None,
            })),
        }
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is absent or the stored record fails to
    /// parse (corrupt records are logged and treated as absence).
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let inner = self.lock();
        let raw = inner.entries.get(key)?;

        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("stored record under '{key}' is corrupt, treating as absent: {e}");
                None
            }
        }
    }

    /// Whether a record exists under `key` (decoded or not).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Encode `value` and store it under `key`, rewriting the backing file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be serialized or the file
    /// cannot be written.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        let mut inner = self.lock();
        inner.entries.insert(key.to_owned(), raw);
        persist(&inner)
    }

    /// Remove the record under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be rewritten.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }

    /// Remove several records in one file rewrite.
    ///
    /// Used where related keys must disappear together (the session record
    /// and its credential token on logout).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be rewritten.
    pub fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let mut changed = false;
        for key in keys {
            changed |= inner.entries.remove(*key).is_some();
        }

        if changed { persist(&inner) } else { Ok(()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StorageInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rewrite the backing file from the in-memory map.
fn persist(inner: &StorageInner) -> Result<(), StorageError> {
    let Some(path) = &inner.path else {
        return Ok(());
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(&inner.entries)?;
    std::fs::write(path, contents)?;
    Ok(())
}
