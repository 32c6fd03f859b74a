//! File-backed durable storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::broadcast;

use super::{CHANGE_CHANNEL_CAPACITY, DurableStorage, StorageError, StorageEvent};

/// Storage persisted as a single JSON object on disk.
///
/// Every write rewrites the whole document through a temporary file and a
/// rename, so a crash never leaves a half-written file behind. Reads and
/// writes always start from the document on disk, so several handles (or
/// processes) on one path only ever overwrite the key they write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<StorageEvent>,
}

impl FileStorage {
    /// Open the document at `path`, starting empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read, and
    /// `StorageError::Corrupt` if it is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = read_document(&path)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        tracing::debug!(path = %path.display(), keys = values.len(), "opened file storage");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            changes,
        })
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let guard = self.write_lock.lock()?;
        let mut values = read_document(&self.path)?;
        apply(&mut values);
        self.write_document(&values)?;
        drop(guard);

        let _ = self.changes.send(StorageEvent {
            key: key.to_owned(),
        });
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(read_document(&self.path)?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(key, |values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(key, |values| {
            values.remove(key);
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::keys;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("katcakes-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("katcakesCart", "[1,2]").unwrap();
        storage.set("other", "x").unwrap();
        storage.remove("other").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("katcakesCart").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("other").unwrap(), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_corrupt_document_is_reported() {
        let path = temp_path("broken.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Corrupt(_))
        ));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_handles_on_one_path_keep_each_others_keys() {
        let path = temp_path("storage.json");
        let tab_a = FileStorage::open(&path).unwrap();
        let tab_b = FileStorage::open(&path).unwrap();

        tab_a.set(keys::SESSION_USER_ID, "u-1").unwrap();
        tab_b.set(keys::CART, "[]").unwrap();

        assert_eq!(tab_b.get(keys::SESSION_USER_ID).unwrap().as_deref(), Some("u-1"));
        assert_eq!(tab_a.get(keys::CART).unwrap().as_deref(), Some("[]"));

        tab_b.remove(keys::CART).unwrap();
        tab_a.set(keys::CART, "[1]").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get(keys::SESSION_USER_ID).unwrap().as_deref(),
            Some("u-1")
        );
        assert_eq!(reopened.get(keys::CART).unwrap().as_deref(), Some("[1]"));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
