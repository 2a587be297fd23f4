//! Key/value store standing in for browser local storage.
//!
//! Values live in memory and are mirrored to a single JSON file. Persistence is
//! best-effort: a failed write is logged and the in-memory value stays usable
//! for the rest of the process.

use crate::errors::{AdvisorError, AdvisorResult};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Debug, Default)]
struct StoreInner {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

/// Cheap cloneable handle; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl LocalStore {
    /// Opens the store backed by `path`. A missing or corrupt file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_file(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("Local store at {} unreadable, starting empty: {}", path.display(), e);
                Map::new()
            }
        };
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                path: Some(path),
                values,
            })),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.lock()
            .values
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.lock().values.get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring malformed value under '{}': {}", key, e);
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().values.contains_key(key)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .values
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn set_string(&self, key: &str, value: &str) {
        self.set_value(key, Value::String(value.to_string()));
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => self.set_value(key, v),
            Err(e) => warn!("Could not serialize value for '{}': {}", key, e),
        }
    }

    pub fn remove(&self, key: &str) {
        let mut inner = self.lock();
        if inner.values.remove(key).is_some() {
            persist_logged(&inner);
        }
    }

    fn set_value(&self, key: &str, value: Value) {
        let mut inner = self.lock();
        inner.values.insert(key.to_string(), value);
        persist_logged(&inner);
    }
}

fn load_file(path: &Path) -> AdvisorResult<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(AdvisorError::storage_error("store file is not a JSON object")),
    }
}

fn persist_logged(inner: &StoreInner) {
    if let Err(e) = persist(inner) {
        warn!("Local store write failed, keeping value in memory: {}", e);
    }
}

fn persist(inner: &StoreInner) -> AdvisorResult<()> {
    let Some(path) = &inner.path else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(&inner.values)?)?;
    fs::rename(&tmp, path)?;
    debug!("Local store flushed to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = LocalStore::open(&path);
        store.set_string("session_id", "abc");
        store.set_json("chat_abc", &vec!["one", "two"]);

        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.get_string("session_id").as_deref(), Some("abc"));
        assert_eq!(
            reopened.get_json::<Vec<String>>("chat_abc"),
            Some(vec!["one".to_string(), "two".to_string()])
        );
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        let store = LocalStore::open(&path);
        assert!(store.get_string("session_id").is_none());
        store.set_string("session_id", "fresh");
        assert_eq!(store.get_string("session_id").as_deref(), Some("fresh"));
    }

    #[test]
    fn test_unwritable_path_keeps_value_in_memory() {
        let dir = tempdir().unwrap();
        // a regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = LocalStore::open(blocker.join("storage.json"));

        store.set_string("user_uuid", "v1");
        assert_eq!(store.get_string("user_uuid").as_deref(), Some("v1"));
    }

    #[test]
    fn test_clones_share_state_and_prefix_scan() {
        let store = LocalStore::in_memory();
        let other = store.clone();
        store.set_json("pending_sync_a", &true);
        store.set_json("pending_sync_b", &true);
        store.set_string("session_id", "a");

        let mut keys = other.keys_with_prefix("pending_sync_");
        keys.sort();
        assert_eq!(keys, vec!["pending_sync_a", "pending_sync_b"]);

        other.remove("pending_sync_a");
        assert!(!store.contains("pending_sync_a"));
    }
}
