//! # Ranking Storage
//!
//! The leaderboard is persisted as a JSON array of entries:
//!
//! ```text
//! [{"name":"mina","score":1200,"timestamp":1760000000000}, ...]
//! ```
//!
//! Two stores are provided:
//!
//! - [`JsonFileStore`]: one file on disk, written via temp file + rename
//! - [`MemoryStore`]: a shared key-value map of text records, the same shape
//!   as a browser's local storage

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{RankingError, RankingResult};
use crate::table::RankingEntry;

/// Key the ranking record is stored under in key-value stores.
pub const DEFAULT_KEY: &str = "ranking";

/// Durable home of the leaderboard.
pub trait RankingStore: Send {
    /// Reads all stored entries. A store that was never written reads as empty.
    ///
    /// # Errors
    ///
    /// [`RankingError::StorageUnavailable`] if the medium cannot be read,
    /// [`RankingError::Corrupt`] if the record cannot be decoded.
    fn read(&self) -> RankingResult<Vec<RankingEntry>>;

    /// Replaces the stored entries.
    ///
    /// # Errors
    ///
    /// [`RankingError::StorageUnavailable`] if the medium cannot be written.
    fn write(&self, entries: &[RankingEntry]) -> RankingResult<()>;
}

impl<T: RankingStore + ?Sized> RankingStore for Box<T> {
    fn read(&self) -> RankingResult<Vec<RankingEntry>> {
        (**self).read()
    }

    fn write(&self, entries: &[RankingEntry]) -> RankingResult<()> {
        (**self).write(entries)
    }
}

fn decode(text: &str) -> RankingResult<Vec<RankingEntry>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| RankingError::Corrupt(e.to_string()))
}

fn encode(entries: &[RankingEntry]) -> RankingResult<String> {
    serde_json::to_string(entries).map_err(|e| RankingError::Corrupt(e.to_string()))
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the leaderboard in a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RankingStore for JsonFileStore {
    fn read(&self) -> RankingResult<Vec<RankingEntry>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => decode(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(RankingError::StorageUnavailable(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, entries: &[RankingEntry]) -> RankingResult<()> {
        let text = encode(entries)?;
        let tmp = self.temp_path();
        let unavailable = |e: std::io::Error| {
            RankingError::StorageUnavailable(format!("{}: {e}", self.path.display()))
        };

        std::fs::write(&tmp, text).map_err(unavailable)?;
        std::fs::rename(&tmp, &self.path).map_err(unavailable)?;

        tracing::debug!("Ranking written: {} entries -> {}", entries.len(), self.path.display());
        Ok(())
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory key-value text store.
///
/// Clones share the same map, so a game view and a leaderboard view can hold
/// separate handles to one store. It can be switched offline to simulate a
/// storage medium that refuses access.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
    available: Arc<AtomicBool>,
    key: String,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store using [`DEFAULT_KEY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(DEFAULT_KEY)
    }

    /// Creates an empty store using a custom key.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            key: key.into(),
        }
    }

    /// Returns a handle to the same map under a different key.
    #[must_use]
    pub fn scoped(&self, key: impl Into<String>) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            available: Arc::clone(&self.available),
            key: key.into(),
        }
    }

    /// Raw text stored under this store's key.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slots.lock().get(&self.key).cloned()
    }

    /// Overwrites the raw text under this store's key.
    pub fn set_raw(&self, text: impl Into<String>) {
        self.slots.lock().insert(self.key.clone(), text.into());
    }

    /// Switches the store on or off. While off, every read and write fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    fn check_available(&self) -> RankingResult<()> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(RankingError::StorageUnavailable(format!(
                "memory store offline (key {})",
                self.key
            )))
        }
    }
}

impl RankingStore for MemoryStore {
    fn read(&self) -> RankingResult<Vec<RankingEntry>> {
        self.check_available()?;
        match self.raw() {
            Some(text) => decode(&text),
            None => Ok(Vec::new()),
        }
    }

    fn write(&self, entries: &[RankingEntry]) -> RankingResult<()> {
        self.check_available()?;
        let text = encode(entries)?;
        self.set_raw(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.read().unwrap().is_empty());

        let entries = vec![RankingEntry::new("a", 300, 1), RankingEntry::new("b", 100, 2)];
        store.write(&entries).unwrap();
        assert_eq!(store.read().unwrap(), entries);
        assert!(store.raw().unwrap().contains("\"score\":300"));
    }

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.write(&[RankingEntry::new("a", 1, 0)]).unwrap();
        assert_eq!(view.read().unwrap().len(), 1);

        let other = store.scoped("other");
        assert!(other.read().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_offline() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(store.read(), Err(RankingError::StorageUnavailable(_))));
        assert!(matches!(store.write(&[]), Err(RankingError::StorageUnavailable(_))));

        store.set_available(true);
        assert!(store.read().is_ok());
    }

    #[test]
    fn test_corrupt_record() {
        let store = MemoryStore::new();
        store.set_raw("{not json");
        assert!(matches!(store.read(), Err(RankingError::Corrupt(_))));
    }

    #[test]
    fn test_blank_record_reads_empty() {
        let store = MemoryStore::new();
        store.set_raw("  ");
        assert!(store.read().unwrap().is_empty());
    }
}
