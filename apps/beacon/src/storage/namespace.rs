use super::{KeyValueStore, StorageError};

/// Prefix applied to every key by the deployed web front-end.
pub const DEFAULT_NAMESPACE: &str = "techno-beacon-";

/// Wraps a store so logical keys land under a shared prefix.
#[derive(Debug, Clone)]
pub struct Namespaced<S> {
    inner: S,
    prefix: String,
}

impl<S> Namespaced<S> {
    pub fn new(inner: S, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    pub fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Logical key for a raw substrate key, or `None` if it belongs to someone else.
    pub fn strip<'k>(&self, raw_key: &'k str) -> Option<&'k str> {
        raw_key.strip_prefix(self.prefix.as_str())
    }
}

impl<S: KeyValueStore> KeyValueStore for Namespaced<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(&self.full_key(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.write(&self.full_key(key), value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(&self.full_key(key))
    }
}
