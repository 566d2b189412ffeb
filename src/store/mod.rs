//! Durable settings storage.
//!
//! A deliberately small key-value contract: readers get `None` on any
//! failure, writers are best-effort. Callers own validation of whatever
//! they read back — the store never interprets values.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

/// Durable key-value storage for small string settings.
pub trait SettingsStore: Send + Sync {
    /// Returns the stored value, or `None` if absent or the backing
    /// storage is unavailable. Never surfaces an error.
    fn get(&self, key: &str) -> Option<String>;

    /// Best-effort write; failures are logged and swallowed.
    fn set(&self, key: &str, value: &str);
}

// ============================================================================
// FileStore
// ============================================================================

/// One file per key under a settings directory.
///
/// The directory is created on first write. Keys are internal
/// identifiers, never user input.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk until
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw.trim().to_string()),
            Err(err) => {
                debug!(key, path = %path.display(), %err, "settings read missed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), %err, "settings dir unavailable; write dropped");
            return;
        }
        let path = self.path_for(key);
        if let Err(err) = fs::write(&path, value) {
            warn!(key, path = %path.display(), %err, "settings write failed; value dropped");
        }
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a single value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.set(key, value);
        store
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .expect("settings lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("settings lock poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================
