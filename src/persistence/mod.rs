//! Local persistence of session slots.
//!
//! Two independent slots are mirrored from the in-memory session: the chat
//! history and the uploaded-file list. Raw stores only move strings around;
//! [`Persistence`] adds JSON encoding and the fail-soft contract: loading a
//! missing or malformed slot yields `None`, and no store failure ever reaches
//! the caller.

pub mod error;
pub mod file_store;
pub mod memory_store;

pub use error::{PersistenceError, PersistenceResult};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> PersistenceResult<()>;

    /// Delete a value; deleting an absent key succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be modified.
    fn remove(&self, key: &str) -> PersistenceResult<()>;
}

/// Persisted collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Array of messages.
    ChatHistory,
    /// Array of uploaded-file descriptors.
    UploadedFiles,
}

impl Slot {
    /// Storage key of the slot.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ChatHistory => "research-chat-history",
            Self::UploadedFiles => "research-uploaded-files",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed, fail-soft view over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Wrap a raw store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persistence backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load and decode a slot. Missing, unreadable or malformed data is `None`.
    #[must_use]
    pub fn load<T: DeserializeOwned>(&self, slot: Slot) -> Option<T> {
        let raw = match self.store.get(slot.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("Failed to read {slot}: {err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring malformed {slot}: {err}");
                None
            }
        }
    }

    /// Encode and store a value. Failures are logged.
    pub fn save<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("Failed to encode {slot}: {err}");
                return;
            }
        };

        if let Err(err) = self.store.set(slot.key(), &encoded) {
            warn!("Failed to write {slot}: {err}");
        }
    }

    /// Store a collection unless it is empty.
    ///
    /// An empty collection leaves the previous value in place, so a transient
    /// empty state (startup, before restore) never wipes stored history.
    pub fn save_non_empty<T: Serialize>(&self, slot: Slot, items: &[T]) {
        if items.is_empty() {
            debug!("Skipping save of empty {slot}");
            return;
        }
        self.save(slot, items);
    }

    /// Delete a slot. Failures are logged.
    pub fn clear(&self, slot: Slot) {
        if let Err(err) = self.store.remove(slot.key()) {
            warn!("Failed to clear {slot}: {err}");
        }
    }
}
