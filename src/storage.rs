//! Key-value persistence used for plugin state.
//!
//! The store only knows about opaque JSON values. What lives under each key is
//! decided by the caller (see [`crate::history`]).

use crate::core::error::LeetobError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, LeetobError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), LeetobError>;
}

/// Volatile store, used by tests and one-shot runs that should not touch disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, LeetobError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), LeetobError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Write `contents` to a `.tmp` sibling, fsync it, then rename it over `path`.
///
/// Readers see either the previous file or the new one, never a partial write.
fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), LeetobError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents)?;
        writer.flush()?;
    }

    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Parse the store file. Anything but a JSON object is logged and treated as empty.
fn parse_entries(path: &Path, contents: &str) -> Map<String, Value> {
    if contents.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("{} does not contain a JSON object, starting empty", path.display());
            Map::new()
        }
        Err(e) => {
            warn!("Discarding unreadable state file {}: {}", path.display(), e);
            Map::new()
        }
    }
}

/// Whole-file JSON object store. Every `set` atomically rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LeetobError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            parse_entries(&path, &contents)
        } else {
            Map::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "opened state store");
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), LeetobError> {
        let contents = serde_json::to_vec_pretty(&self.entries)?;
        atomic_write(&self.path, &contents)
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, LeetobError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), LeetobError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_json_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("conversations", json!({"1": []})).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("conversations").unwrap(), Some(json!({"1": []})));
    }

    #[test]
    fn test_json_file_store_starts_empty_on_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("conversations").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"leetob_conversations_v1": {"1": [{"role": "us"#).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("leetob_conversations_v1").unwrap().is_none());

        store.set("leetob_conversations_v1", json!({"1": []})).unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("leetob_conversations_v1").unwrap(),
            Some(json!({"1": []}))
        );
    }

    #[test]
    fn test_set_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("k", json!(1)).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, json!({"k": 1}));
    }
}
