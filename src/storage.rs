// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable key-value persistence for session state.
//!
//! The original client kept its token and profile in browser local
//! storage; here the medium is behind a small trait so the session store
//! stays decoupled from any specific backing (a JSON file on disk for
//! real use, an in-memory map for tests and embedding).

use crate::error::{ClientError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Injected persistence collaborator for the session store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key is absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value durably.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile in-memory store. Used by tests and by embedders that manage
/// persistence themselves.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("store lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("store lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

/// File-backed store: a single JSON object snapshot, rewritten on every
/// mutation. Suits the handful of small session keys this client keeps.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, loading the existing snapshot if present. A missing
    /// file is an empty store; an unreadable snapshot fails closed as
    /// empty (the session layer treats that as "not signed in").
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable session snapshot");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(ClientError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            ClientError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClientError::Storage("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClientError::Storage("store lock poisoned".to_string()))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token"), None);

        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("abc"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token"), None);
        store.remove("token").unwrap(); // idempotent
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let path = std::env::temp_dir().join(format!(
            "civicflow-store-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("token", "abc").unwrap();
            store.set("user", "{\"email\":\"a@b.c\"}").unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("token").as_deref(), Some("abc"));
        reopened.remove("token").unwrap();
        assert_eq!(reopened.get("token"), None);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_tolerates_corrupt_snapshot() {
        let path = std::env::temp_dir().join(format!(
            "civicflow-store-corrupt-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("token"), None);

        let _ = std::fs::remove_file(&path);
    }
}
