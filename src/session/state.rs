//! Session state owned by the controller.
//!
//! Every transition replaces whole values: a message is swapped for its
//! updated copy, a file list is swapped for the filtered list. Persistence
//! snapshots taken between transitions are therefore always consistent.

use super::types::{Message, UploadedFile};

/// Ephemeral UI flags. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiFlags {
    /// A chat exchange or an upload batch is in flight.
    pub loading: bool,
    /// A drag is hovering over the input.
    pub drag_over: bool,
}

/// Messages, files and flags of one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    messages: Vec<Message>,
    files: Vec<UploadedFile>,
    /// UI flags.
    pub flags: UiFlags,
}

impl SessionState {
    /// State restored from persisted collections.
    #[must_use]
    pub fn restored(messages: Vec<Message>, files: Vec<UploadedFile>) -> Self {
        Self {
            messages,
            files,
            flags: UiFlags::default(),
        }
    }

    /// Messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Files in insertion order.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Paths of the files the backend can resolve.
    #[must_use]
    pub fn server_file_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.is_server_file)
            .map(|f| f.path.clone())
            .collect()
    }

    /// Append messages at the end.
    pub fn append_messages(&mut self, new: impl IntoIterator<Item = Message>) {
        self.messages.extend(new);
    }

    /// Replace the message `id` with `update(current)`.
    ///
    /// Returns `false` when no message has that id.
    pub fn replace_message(&mut self, id: &str, update: impl FnOnce(Message) -> Message) -> bool {
        let Some(idx) = self.messages.iter().position(|m| m.id == id) else {
            return false;
        };
        let current = self.messages[idx].clone();
        self.messages[idx] = update(current);
        true
    }

    /// Drop every message.
    pub fn clear_messages(&mut self) {
        self.messages = Vec::new();
    }

    /// Append files at the end.
    pub fn append_files(&mut self, new: impl IntoIterator<Item = UploadedFile>) {
        self.files.extend(new);
    }

    /// Remove every file named `name`, returning the removed descriptors.
    pub fn remove_files_named(&mut self, name: &str) -> Vec<UploadedFile> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.name == name);
        self.files = kept;
        removed
    }

    /// Remove every file, returning the removed descriptors.
    pub fn take_files(&mut self) -> Vec<UploadedFile> {
        std::mem::take(&mut self.files)
    }
}
