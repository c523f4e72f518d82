use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Storage key for the persisted credential pair.
pub const SESSION_KEY: &str = "senarPortalLogin";

/// Minimal durable key-value capability. Reads are infallible: absent or
/// unreadable values are `None`, so callers never branch on storage errors.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// One file per key under the portal data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            log::error!("Failed to create data dir {}: {}", self.dir.display(), e);
            return;
        }
        if let Err(e) = std::fs::write(self.path_for(key), value) {
            log::error!("Failed to persist {}: {}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path_for(key)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to clear {}: {}", key, e);
            }
        }
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// The persisted credential pair, stored as JSON with the wire-side field
/// names the original portal used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLogin {
    pub dfe: String,
    #[serde(rename = "schoolCode")]
    pub school_code: String,
}

/// Credential persistence over an injected key-value store.
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, dfe: &str, school_code: &str) {
        let saved = SavedLogin {
            dfe: dfe.to_string(),
            school_code: school_code.to_string(),
        };
        match serde_json::to_string(&saved) {
            Ok(json) => self.store.set(SESSION_KEY, &json),
            Err(e) => log::error!("Failed to serialize saved login: {}", e),
        }
    }

    /// A missing or malformed stored value reads as "no saved session".
    pub fn load(&self) -> Option<SavedLogin> {
        let raw = self.store.get(SESSION_KEY)?;
        let saved: SavedLogin = serde_json::from_str(&raw).ok()?;
        if saved.dfe.is_empty() || saved.school_code.is_empty() {
            return None;
        }
        Some(saved)
    }

    pub fn clear(&self) {
        self.store.remove(SESSION_KEY);
    }
}
