use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{KeyValueStore, StorageError};

/// In-process store, optionally capped like a browser origin's storage quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes that would push the total of key and value bytes past `quota_bytes`
    /// fail with [`StorageError::QuotaExceeded`].
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    fn used_bytes_without(entries: &BTreeMap<String, String>, key: &str) -> usize {
        entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.borrow_mut();
        if let Some(quota) = self.quota_bytes {
            let needed = Self::used_bytes_without(&entries, key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() -> Result<(), StorageError> {
        let store = MemoryStore::new();
        assert_eq!(store.read("home-city")?, None);

        store.write("home-city", "Paris, France")?;
        assert_eq!(store.read("home-city")?.as_deref(), Some("Paris, France"));

        store.remove("home-city")?;
        assert_eq!(store.read("home-city")?, None);
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() -> Result<(), StorageError> {
        let store = MemoryStore::with_quota(24);
        store.write("home-city", "Berlin")?;

        let result = store.write("home-city", "Llanfairpwllgwyngyll, Wales");
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(store.read("home-city")?.as_deref(), Some("Berlin"));
        Ok(())
    }

    #[test]
    fn overwriting_a_key_does_not_count_its_old_value() -> Result<(), StorageError> {
        let store = MemoryStore::with_quota(20);
        store.write("home-city", "Berlin")?;
        store.write("home-city", "Hamburg")?;
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
