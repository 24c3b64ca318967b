//! Durable key/value store for finished timer durations.
//!
//! Each timer slot owns two keys, derived from its position in the grid:
//!
//! - `timer-{index}-seconds-left`
//! - `timer-{index}-original-full-time`
//!
//! A timer reads both once when it is created and writes both when its
//! countdown reaches zero. Values are stored as decimal strings; anything
//! that is missing or does not parse reads back as `0`.
//!
//! Keys belong to the slot, not to a particular timer. Shrinking the grid and
//! growing it again hands the old values at index `k` to the new timer at
//! index `k`.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage key holding the seconds left when timer `index` last finished.
pub fn seconds_left_key(index: usize) -> String {
    format!("timer-{index}-seconds-left")
}

/// Storage key holding the full duration of timer `index` when it last finished.
pub fn full_time_key(index: usize) -> String {
    format!("timer-{index}-original-full-time")
}

/// A string key/value store.
///
/// Implementations use interior mutability so one store can be shared by
/// every timer in the grid behind an `Arc`.
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Returns the value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Durations recovered for one timer slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedDurations {
    /// Seconds left when the timer last finished (normally 0).
    pub seconds_left: u64,
    /// The full duration the timer was started with.
    pub full_time: u64,
}

/// Reads the saved durations for `index`, defaulting each to 0.
pub fn load_durations(store: &dyn Store, index: usize) -> SavedDurations {
    let read = |key: String| {
        store
            .get(&key)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0)
    };
    SavedDurations {
        seconds_left: read(seconds_left_key(index)),
        full_time: read(full_time_key(index)),
    }
}

/// Writes the durations for `index`. Failures are logged, never returned: the
/// store is best effort.
pub fn save_durations(store: &dyn Store, index: usize, saved: SavedDurations) {
    let writes = [
        (full_time_key(index), saved.full_time),
        (seconds_left_key(index), saved.seconds_left),
    ];
    for (key, value) in writes {
        if let Err(err) = store.set(&key, &value.to_string()) {
            tracing::warn!(%key, error = %err, "failed to persist timer duration");
        }
    }
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object in a file.
///
/// The file is read once when opened and rewritten in full on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; a file
    /// that is not a JSON object of strings is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| Error::FileIo {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| Error::Store {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened timer store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Default location: `$DATA_DIR/timer-grid/timers.json`.
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(Error::DirNotFound("data"))?;
        Ok(data_dir.join("timer-grid").join("timers.json"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::FileIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| Error::Store {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(|source| Error::FileIo {
            path: self.path.clone(),
            source,
        })
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }
}
