//! Local handles for files the backend never received.
//!
//! A handle is an opaque `blob:` string bound to the file's bytes. The binding
//! lives until the handle is released; releasing frees the bytes and is
//! effective exactly once.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

/// Prefix shared by every local handle.
pub const HANDLE_PREFIX: &str = "blob:research-assistant/";

/// True when `path` is a local handle rather than a backend path.
#[must_use]
pub fn is_local_handle(path: &str) -> bool {
    path.starts_with(HANDLE_PREFIX)
}

/// Shared table of live handle bindings.
#[derive(Clone, Debug, Default)]
pub struct LocalHandleRegistry {
    bindings: Arc<DashMap<String, Bytes>>,
}

impl LocalHandleRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `bytes` to a fresh handle.
    #[must_use]
    pub fn allocate(&self, bytes: Bytes) -> String {
        let handle = format!("{HANDLE_PREFIX}{}", Uuid::new_v4());
        self.bindings.insert(handle.clone(), bytes);
        handle
    }

    /// Free a binding. Returns `false` when the handle was not live.
    #[must_use]
    pub fn release(&self, handle: &str) -> bool {
        self.bindings.remove(handle).is_some()
    }

    /// Number of live bindings.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.bindings.len()
    }
}
