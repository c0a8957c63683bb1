//! Persistent key-value state.
//!
//! Small app state (currently just the search history) lives in a single
//! JSON object on disk. Values are cached in memory and the whole file is
//! rewritten on every modification.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::history::HistoryStore;
use crate::error::{LensError, LensResult};

/// Key holding the search history array.
pub const HISTORY_KEY: &str = "searchHistory";

/// JSON-file backed key-value store.
pub struct StateStore {
    /// Path to the state file.
    path: PathBuf,
    /// In-memory cache of stored values.
    cache: Mutex<HashMap<String, Value>>,
}

impl StateStore {
    /// Open the store at `path`.
    ///
    /// A missing or corrupt file starts an empty cache; it is only created
    /// on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let cache = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    log::warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                    HashMap::new()
                }),
                Err(e) => {
                    log::warn!("Failed to read state file {}: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            path,
            cache: Mutex::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a value from storage.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Set a value in storage.
    ///
    /// The value is immediately written to disk.
    pub fn set(&self, key: &str, value: Value) -> LensResult<()> {
        let mut cache = self.lock();
        cache.insert(key.to_string(), value);
        self.write(&cache)
    }

    /// Remove a key from storage.
    pub fn remove(&self, key: &str) -> LensResult<()> {
        let mut cache = self.lock();
        if cache.remove(key).is_some() {
            self.write(&cache)?;
        }
        Ok(())
    }

    /// Check if a key exists in storage.
    pub fn has(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn write(&self, cache: &HashMap<String, Value>) -> LensResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LensError::Storage(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let contents = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, contents).map_err(|e| {
            LensError::Storage(format!(
                "Failed to write state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl HistoryStore for StateStore {
    fn load(&self) -> LensResult<Vec<String>> {
        match self.get(HISTORY_KEY) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[String]) -> LensResult<()> {
        self.set(HISTORY_KEY, serde_json::to_value(entries)?)
    }
}
