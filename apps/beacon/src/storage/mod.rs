//! Key-value persistence substrate.
//!
//! Everything the app remembers between sessions goes through [`KeyValueStore`]:
//! a synchronous, string-keyed, string-valued store with the semantics of the
//! browser's `localStorage`. Adapters report failures as [`StorageError`]; the
//! stores built on top ([`crate::radar`], [`crate::selection`],
//! [`crate::home_city`]) turn every failure into their documented default and
//! never hand an error back to the caller.

pub mod events;
pub mod file;
pub mod memory;
pub mod namespace;

use std::rc::Rc;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use events::{ContextId, ContextStorage, StorageChange, StorageEvents, Subscription};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use namespace::{Namespaced, DEFAULT_NAMESPACE};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored data under {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Synchronous string-keyed storage.
pub trait KeyValueStore {
    /// `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Logical keys the app persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SelectedLegends,
    HomeCity,
    RadarEvents,
}

impl StorageKey {
    pub const ALL: [Self; 3] = [Self::SelectedLegends, Self::HomeCity, Self::RadarEvents];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectedLegends => "selected-legends",
            Self::HomeCity => "home-city",
            Self::RadarEvents => "radar-events",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

/// Decode a JSON value stored under `key`.
pub fn load_json<T, S>(store: &S, key: StorageKey) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.read(key.as_str())? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Decode the JSON value under `key`, or `default()` when it is absent, unreadable
/// or malformed.
pub fn read_json_or<T, S, F>(store: &S, key: StorageKey, default: F) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: FnOnce() -> T,
{
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            warn!("falling back to default for {}: {e}", key.as_str());
            default()
        }
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T, S>(store: &S, key: StorageKey, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let encoded = serde_json::to_string(value)?;
    store.write(key.as_str(), &encoded)
}

/// [`save_json`] with the failure logged and dropped.
pub fn persist_json<T, S>(store: &S, key: StorageKey, value: &T) -> bool
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    match save_json(store, key, value) {
        Ok(()) => true,
        Err(e) => {
            warn!("dropped write of {}: {e}", key.as_str());
            false
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FailingStore;
    use super::*;

    #[test]
    fn missing_key_reads_default() {
        let store = MemoryStore::new();
        let ids: Vec<String> = read_json_or(&store, StorageKey::SelectedLegends, Vec::new);
        assert!(ids.is_empty());
    }

    #[test]
    fn malformed_json_reads_default() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        store.write(StorageKey::SelectedLegends.as_str(), "{not json")?;

        let ids: Vec<String> = read_json_or(&store, StorageKey::SelectedLegends, Vec::new);
        assert!(ids.is_empty());
        assert!(matches!(
            load_json::<Vec<String>, _>(&store, StorageKey::SelectedLegends),
            Err(StorageError::Serialization(_))
        ));
        Ok(())
    }

    #[test]
    fn failing_substrate_degrades_to_default() {
        let ids: Vec<String> = read_json_or(&FailingStore, StorageKey::RadarEvents, Vec::new);
        assert!(ids.is_empty());
        assert!(!persist_json(&FailingStore, StorageKey::RadarEvents, &ids));
    }

    #[test]
    fn json_round_trips_through_store() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let ids = vec!["jeff-mills".to_string(), "robert-hood".to_string()];
        save_json(&store, StorageKey::SelectedLegends, &ids)?;

        let read: Option<Vec<String>> = load_json(&store, StorageKey::SelectedLegends)?;
        assert_eq!(read, Some(ids));
        assert_eq!(
            store.read("selected-legends")?.as_deref(),
            Some(r#"["jeff-mills","robert-hood"]"#)
        );
        Ok(())
    }

    #[test]
    fn storage_keys_parse_back() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(StorageKey::parse("techno-beacon-home-city"), None);
    }
}
