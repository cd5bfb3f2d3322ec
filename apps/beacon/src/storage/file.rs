use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{KeyValueStore, StorageError};

/// Key-value store kept in a single JSON object on disk.
///
/// Every write rewrites the whole document through a temporary file and a rename,
/// so a crash mid-write leaves the previous document intact. Concurrent writers
/// resolve last-write-wins at document granularity.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open a store, creating the parent directory when it is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document contents; a missing file is an empty store.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn snapshot_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.snapshot() {
            Err(StorageError::Corrupt { key, reason }) => {
                warn!("replacing corrupt store {key}: {reason}");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn commit(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let written = write_synced(&tmp_path, encoded.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("could not remove {}: {cleanup}", tmp_path.display());
                }
            }
            return Err(e.into());
        }
        debug!("wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.snapshot_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.commit(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.snapshot_for_update()?;
        if entries.remove(key).is_some() {
            self.commit(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("store.json"));

        assert_eq!(store.read("home-city")?, None);
        assert!(store.snapshot()?.is_empty());
        Ok(())
    }

    #[test]
    fn failed_commit_removes_temporary_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        // a non-empty directory in the way makes the rename fail
        fs::create_dir(&path)?;
        fs::write(path.join("occupied"), "x")?;
        let store = FileStore::new(&path);

        let mut entries = BTreeMap::new();
        entries.insert("home-city".to_string(), "Berlin, DE".to_string());
        assert!(matches!(store.commit(&entries), Err(StorageError::Io(_))));
        assert!(!dir.path().join("store.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn values_survive_reopening() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path)?;
        store.write("home-city", "Paris, France")?;
        store.write("selected-legends", r#"["jeff-mills"]"#)?;

        let reopened = FileStore::open(&path)?;
        assert_eq!(reopened.read("home-city")?.as_deref(), Some("Paris, France"));
        assert_eq!(
            reopened.read("selected-legends")?.as_deref(),
            Some(r#"["jeff-mills"]"#)
        );

        reopened.remove("home-city")?;
        assert_eq!(store.read("home-city")?, None);
        Ok(())
    }

    #[test]
    fn corrupt_file_errors_on_read_and_is_replaced_on_write(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        fs::write(&path, "{ definitely not json")?;

        let store = FileStore::new(&path);
        assert!(matches!(
            store.read("home-city"),
            Err(StorageError::Corrupt { .. })
        ));

        store.write("home-city", "Detroit, USA")?;
        assert_eq!(store.read("home-city")?.as_deref(), Some("Detroit, USA"));
        Ok(())
    }
}
