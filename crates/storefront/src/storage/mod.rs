//! Durable client storage.
//!
//! Key/value persistence that survives reloads, is readable and writable
//! synchronously, and announces every successful write to all subscribers
//! sharing the same backing store (the "other tabs"). There is no lock across
//! writers: the last write wins.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStorage`] - process-local, shared by cloning an `Arc`
//! - [`FileStorage`] - a JSON document on disk

mod file;

pub use file::FileStorage;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;

/// Keys under which the storefront persists its state.
pub mod keys {
    /// Serialized cart entry list.
    pub const CART: &str = "katcakesCart";

    /// Opaque user id of the authenticated account.
    pub const SESSION_USER_ID: &str = "katcakesUserId";
}

/// Buffered change notifications per subscriber.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// Notification that a key was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
}

/// Synchronous key/value store shared by every tab of the same origin.
pub trait DurableStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value and broadcast a change event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write does not reach the backing store.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value and broadcast a change event. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be updated.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribe to change events from every writer.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Process-local storage.
///
/// Share one instance (behind an `Arc`) between several stores to model
/// several tabs of the same browser.
#[derive(Debug)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<StorageEvent>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: Mutex::new(HashMap::new()),
            changes,
        }
    }

    fn notify(&self, key: &str) {
        // No subscribers is fine.
        let _ = self.changes.send(StorageEvent {
            key: key.to_owned(),
        });
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()?
            .insert(key.to_owned(), value.to_owned());
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock()?.remove(key);
        self.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.changes.subscribe()
    }
}
