// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Completion store: the single persisted "tour seen" flag.
//!
//! The flag is read once when a [`Tour`](crate::bridge::Tour) is built and
//! written when the tour terminates. It is binary and has no schema.
//!
//! Two implementations ship with the crate:
//! - [`MemoryStore`]: process-local, with an [unavailable](MemoryStore::unavailable)
//!   mode that fails every call.
//! - [`FileStore`]: a JSON object of named flags on disk, the desktop analogue of
//!   browser local storage.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_STORAGE_KEY, TourConfig};
use crate::error::StoreError;

/// Persistence for the completion flag.
pub trait CompletionStore {
    /// Read the flag. A never-written flag reads as `false`.
    fn load(&self) -> Result<bool, StoreError>;

    /// Overwrite the flag.
    fn save(&mut self, completed: bool) -> Result<(), StoreError>;
}

impl<S: CompletionStore + ?Sized> CompletionStore for &mut S {
    fn load(&self) -> Result<bool, StoreError> {
        (**self).load()
    }

    fn save(&mut self, completed: bool) -> Result<(), StoreError> {
        (**self).save(completed)
    }
}

/// Process-local completion flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryStore {
    completed: bool,
    available: bool,
    writes: u32,
}

impl MemoryStore {
    /// An available store holding `completed`.
    pub fn new(completed: bool) -> Self {
        Self {
            completed,
            available: true,
            writes: 0,
        }
    }

    /// A store whose every call fails, as when storage is disabled.
    pub fn unavailable() -> Self {
        Self {
            completed: false,
            available: false,
            writes: 0,
        }
    }

    /// The flag as last saved.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Number of successful saves.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CompletionStore for MemoryStore {
    fn load(&self) -> Result<bool, StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        Ok(self.completed)
    }

    fn save(&mut self, completed: bool) -> Result<(), StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        self.completed = completed;
        self.writes += 1;
        Ok(())
    }
}

/// Completion flag kept under a key in a JSON object file.
///
/// Other keys in the file are preserved on save. A missing file reads as
/// "not completed".
///
/// ```no_run
/// use understory_tour::store::{CompletionStore, FileStore};
///
/// let mut store = FileStore::new("/tmp/app-state.json");
/// assert_eq!(store.key(), "tour_completed");
/// if !store.load().unwrap_or(false) {
///     // ... run the tour ...
///     store.save(true).ok();
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
    key: String,
}

impl FileStore {
    /// Store under the default key in `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_STORAGE_KEY)
    }

    /// Store under `key` in `path`.
    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Store under the key named by `config.storage_key` in `path`.
    pub fn from_config(path: impl Into<PathBuf>, config: &TourConfig) -> Self {
        Self::with_key(path, config.storage_key.as_str())
    }

    /// Key the flag is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_flags(&self) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

impl CompletionStore for FileStore {
    fn load(&self) -> Result<bool, StoreError> {
        let flags = self.read_flags()?;
        // Browser storage keeps strings, so accept "true" as well as true.
        Ok(match flags.get(&self.key) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        })
    }

    fn save(&mut self, completed: bool) -> Result<(), StoreError> {
        let mut flags = self.read_flags()?;
        flags.insert(self.key.clone(), serde_json::Value::Bool(completed));
        let text = serde_json::to_string_pretty(&flags).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(&self.path, text).map_err(io_err)
    }
}
