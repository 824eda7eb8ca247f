//! Extension storage: a JSON key/value area, plus the typed records kept in it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use core_types::SearchOptions;
use serde_json::Value;

mod expressions;
mod history;

pub use expressions::SavedExpressions;
pub use history::{HISTORY_LIMIT, History, HistoryEntry, now_millis};

pub const OPTIONS_KEY: &str = "options";
pub const HISTORY_KEY: &str = "history";
pub const SAVED_EXPRESSIONS_KEY: &str = "saved_expressions";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a JSON object: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait Storage {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    /// A locked storage accepts writes but keeps nothing (private browsing).
    fn is_locked(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Value>,
    locked: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locked() -> Self {
        Self {
            entries: BTreeMap::new(),
            locked: true,
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        if !self.locked {
            self.entries.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

/// A JSON object on disk, rewritten after every `set`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: serde_json::Map<String, Value>,
    locked: bool,
}

impl FileStorage {
    /// Load `path`. A missing file is an empty storage.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Format {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => serde_json::Map::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        log::debug!(
            target: "background.storage",
            "loaded {} key(s) from {}",
            entries.len(),
            path.display()
        );
        Ok(Self {
            path,
            entries,
            locked: false,
        })
    }

    pub fn with_lock(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, text).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.locked {
            log::trace!(target: "background.storage", "locked, dropping write to {key}");
            return Ok(());
        }
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Stored options, or the defaults when none are stored or they do not parse.
pub fn load_options(storage: &dyn Storage) -> SearchOptions {
    let Some(value) = storage.get(OPTIONS_KEY) else {
        return SearchOptions::default();
    };
    serde_json::from_value(value).unwrap_or_else(|err| {
        log::warn!(target: "background.storage", "stored options unreadable, using defaults: {err}");
        SearchOptions::default()
    })
}

pub fn save_options(storage: &mut dyn Storage, options: &SearchOptions) -> Result<(), StorageError> {
    storage.set(OPTIONS_KEY, serde_json::to_value(options)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn options_fall_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        assert_eq!(load_options(&storage), SearchOptions::default());

        storage.set(OPTIONS_KEY, json!("not an object")).unwrap();
        assert_eq!(load_options(&storage), SearchOptions::default());

        storage
            .set(OPTIONS_KEY, json!({ "match_case": false, "max_results": 5 }))
            .unwrap();
        let options = load_options(&storage);
        assert!(!options.match_case);
        assert_eq!(options.max_results, 5);
        assert!(options.find_by_regex);
    }

    #[test]
    fn locked_memory_storage_keeps_nothing() {
        let mut storage = MemoryStorage::locked();
        storage.set("k", json!(1)).unwrap();
        assert!(storage.is_locked());
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn file_storage_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(OPTIONS_KEY), None);
        let options = SearchOptions {
            persistent_highlights: true,
            ..SearchOptions::default()
        };
        save_options(&mut storage, &options).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(load_options(&reopened), options);
    }

    #[test]
    fn locked_file_storage_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut storage = FileStorage::open(&path).unwrap().with_lock(true);
        storage.set("k", json!(true)).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Format { .. }));
    }
}
