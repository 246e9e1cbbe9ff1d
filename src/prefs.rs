//! Persisted user preferences (language and theme).
//!
//! The store reads each key lazily from its backing storage the first time it
//! is asked for, caches it, and writes through on every `set`. A storage
//! failure never surfaces to callers: it is logged and the in-memory value
//! keeps governing the session.

use crate::i18n::Language;
use crate::theme::Theme;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// The two persisted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Lang,
    Theme,
}

impl PreferenceKey {
    /// Storage key, as used by the site's persistent key-value store.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::Lang => "lang",
            PreferenceKey::Theme => "theme",
        }
    }

    /// Value used when nothing has been stored yet.
    pub fn default_value(&self) -> &'static str {
        match self {
            PreferenceKey::Lang => "en",
            PreferenceKey::Theme => "light",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("preference storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preference storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent string key-value storage.
pub trait PreferenceStorage: Send {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same map, so a clone handed to a
/// second session behaves like the same browser profile after a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a raw stored value, bypassing any store cache.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.peek(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-object file storage: `{"lang": "he", "theme": "dark"}`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .load()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every later write
        let mut map = match self.load() {
            Ok(map) => map,
            Err(StorageError::Corrupt { .. }) => Map::new(),
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), Value::String(value.to_string()));

        let body = serde_json::to_vec_pretty(&map).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, body).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Lazily initialized, write-through preference cache.
pub struct PreferenceStore {
    storage: Box<dyn PreferenceStorage>,
    cache: HashMap<PreferenceKey, String>,
}

impl PreferenceStore {
    pub fn new(storage: Box<dyn PreferenceStorage>) -> Self {
        Self {
            storage,
            cache: HashMap::new(),
        }
    }

    /// Stored value, or the key's default if none was stored (or storage failed).
    pub fn get(&mut self, key: PreferenceKey) -> String {
        if let Some(value) = self.cache.get(&key) {
            return value.clone();
        }

        let value = match self.storage.read(key.as_str()) {
            Ok(Some(value)) => value,
            Ok(None) => key.default_value().to_string(),
            Err(e) => {
                warn!("Could not read preference '{}': {}", key.as_str(), e);
                key.default_value().to_string()
            }
        };

        self.cache.insert(key, value.clone());
        value
    }

    /// Update the value for this session and persist it immediately.
    pub fn set(&mut self, key: PreferenceKey, value: &str) {
        self.cache.insert(key, value.to_string());

        if let Err(e) = self.storage.write(key.as_str(), value) {
            warn!(
                "Could not persist preference '{}' (keeping it for this session): {}",
                key.as_str(),
                e
            );
        }
    }

    /// The stored language, falling back to the default for unknown tags.
    pub fn language(&mut self) -> Language {
        let code = self.get(PreferenceKey::Lang);
        Language::from_code(&code).unwrap_or_else(|e| {
            debug!("Ignoring stored language: {}", e);
            Language::default_language()
        })
    }

    pub fn set_language(&mut self, language: Language) {
        self.set(PreferenceKey::Lang, language.code());
    }

    /// The stored theme, falling back to light for unknown values.
    pub fn theme(&mut self) -> Theme {
        let value = self.get(PreferenceKey::Theme);
        Theme::parse(&value).unwrap_or_else(|| {
            debug!("Ignoring stored theme '{}'", value);
            Theme::default()
        })
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.set(PreferenceKey::Theme, theme.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Storage that refuses every operation, like a browser with storage disabled.
    struct BrokenStorage;

    impl PreferenceStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    // ==================== Defaults ====================

    #[test]
    fn test_defaults_when_empty() {
        let mut store = PreferenceStore::new(Box::new(MemoryStorage::new()));

        assert_eq!(store.get(PreferenceKey::Lang), "en");
        assert_eq!(store.get(PreferenceKey::Theme), "light");
        assert_eq!(store.language(), Language::ENGLISH);
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn test_reading_defaults_does_not_persist_them() {
        let storage = MemoryStorage::new();
        let mut store = PreferenceStore::new(Box::new(storage.clone()));

        store.get(PreferenceKey::Lang);
        assert!(storage.peek("lang").is_none());
    }

    // ==================== Write-through ====================

    #[test]
    fn test_set_persists_immediately() {
        let storage = MemoryStorage::new();
        let mut store = PreferenceStore::new(Box::new(storage.clone()));

        store.set_language(Language::HEBREW);
        store.set_theme(Theme::Dark);

        assert_eq!(storage.peek("lang").as_deref(), Some("he"));
        assert_eq!(storage.peek("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_survives_reload() {
        let storage = MemoryStorage::new();
        {
            let mut store = PreferenceStore::new(Box::new(storage.clone()));
            store.set_language(Language::HEBREW);
        }

        let mut reloaded = PreferenceStore::new(Box::new(storage));
        assert_eq!(reloaded.language(), Language::HEBREW);
    }

    #[test]
    fn test_set_does_not_validate_domain() {
        let storage = MemoryStorage::new();
        let mut store = PreferenceStore::new(Box::new(storage.clone()));

        store.set(PreferenceKey::Theme, "sepia");
        assert_eq!(store.get(PreferenceKey::Theme), "sepia");
        assert_eq!(storage.peek("theme").as_deref(), Some("sepia"));
        // Typed accessor still falls back
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn test_unknown_stored_language_falls_back() {
        let mut storage = MemoryStorage::new();
        storage.write("lang", "fr").unwrap();

        let mut store = PreferenceStore::new(Box::new(storage));
        assert_eq!(store.language(), Language::ENGLISH);
    }

    // ==================== Storage Failures ====================

    #[test]
    fn test_broken_storage_keeps_session_value() {
        let mut store = PreferenceStore::new(Box::new(BrokenStorage));

        assert_eq!(store.language(), Language::ENGLISH);
        store.set_language(Language::HEBREW);
        assert_eq!(store.language(), Language::HEBREW);
    }

    // ==================== File Storage ====================

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("prefs.json");

        let mut storage = FileStorage::new(&path);
        assert_eq!(storage.read("lang").unwrap(), None);

        storage.write("lang", "he").unwrap();
        storage.write("theme", "dark").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.read("lang").unwrap().as_deref(), Some("he"));
        assert_eq!(reopened.read("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{broken").unwrap();

        let mut storage = FileStorage::new(&path);
        assert!(matches!(
            storage.read("lang"),
            Err(StorageError::Corrupt { .. })
        ));

        storage.write("lang", "he").unwrap();
        assert_eq!(storage.read("lang").unwrap().as_deref(), Some("he"));
    }

    #[test]
    fn test_file_storage_unwritable_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing").join("prefs.json");

        let mut store = PreferenceStore::new(Box::new(FileStorage::new(&path)));
        store.set_theme(Theme::Dark);

        assert_eq!(store.theme(), Theme::Dark);
        assert!(!path.exists());
    }
}
