//! Key-value persistence for todos, routines and the reset marker.
//!
//! Every collection is written as a full JSON snapshot under its own key after
//! each mutation. Nothing spans keys transactionally: an interruption between
//! writing `routines` and `lastRoutineReset` leaves the two out of step.
use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{debug, error, trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{Result, TodoError};

/// Key holding the todo collection
pub const TODOS_KEY: &str = "todos";
/// Key holding the routine collection
pub const ROUTINES_KEY: &str = "routines";
/// Key holding the date of the last routine reset
pub const LAST_RESET_KEY: &str = "lastRoutineReset";

/// Every key dailydo owns. Anything else in the namespace is left alone.
pub const STORED_KEYS: [&str; 3] = [TODOS_KEY, ROUTINES_KEY, LAST_RESET_KEY];

/// A flat namespace of text values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw text stored under `key`, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces whatever is stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Lists the keys currently present.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            debug!("Data directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                TodoError::DirectoryError { path: dir.clone() }
            })?;
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            trace!("No file for key '{}' at {}", key, path.display());
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => TodoError::StorageCorruption {
                key: key.to_string(),
                message: format!("{} is not valid UTF-8", path.display()),
            },
            _ => {
                error!("Failed to read {}: {}", path.display(), e);
                TodoError::Io(e)
            }
        })?;
        Ok(Some(text))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        debug!("Writing key '{}' to {}", key, path.display());

        // Write next to the target so the final rename stays on one filesystem
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            TodoError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            TodoError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            TodoError::Io(e)
        })?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            TodoError::Io(e.error)
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            debug!("Removing {}", path.display());
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    keys.push(stem.to_string_lossy().to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| TodoError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory store".to_string(),
            })
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// JSON layer over a [`KeyValueStore`].
pub struct StoreAdapter {
    backend: Box<dyn KeyValueStore>,
}

impl StoreAdapter {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Parses the value under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent and
    /// [`TodoError::StorageCorruption`] when the stored text is not valid JSON
    /// for `T`.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.backend.read(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| TodoError::StorageCorruption {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Parses the value under `key`, falling back to `T::default()` when the
    /// key is absent or its text is corrupted. Corruption is logged and the
    /// stored text is left in place until the next save overwrites it.
    ///
    /// Any other backend failure is returned, so a collection that could not
    /// be read is never replaced by an empty one.
    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.try_load(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                debug!("Key '{}' not found, using default", key);
                Ok(T::default())
            }
            Err(e @ TodoError::StorageCorruption { .. }) => {
                warn!("{}; falling back to an empty value", e);
                Ok(T::default())
            }
            Err(e) => {
                error!("Failed to load key '{}': {}", key, e);
                Err(e)
            }
        }
    }

    /// Serializes `value` and writes it under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|e| {
            error!("Failed to serialize value for key '{}': {}", key, e);
            TodoError::Serialization(e)
        })?;
        self.backend.write(key, &json)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys()
    }

    /// Removes the keys listed in [`STORED_KEYS`] and returns how many of
    /// them were present.
    pub fn remove_stored_keys(&self) -> Result<usize> {
        let present = self.backend.keys()?;
        let mut removed = 0;
        for key in STORED_KEYS {
            if present.iter().any(|k| k == key) {
                self.backend.remove(key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
