//! Chat export to a dated JSON document.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Message;

/// Errors raised while exporting the chat.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The transcript is empty.
    #[error("there are no messages to export")]
    NothingToExport,

    /// No export directory is configured or derivable.
    #[error("no export directory available")]
    NoDirectory,

    /// Writing the document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the document failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias for exports.
pub type ExportResult<T> = Result<T, ExportError>;

/// Exported document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    /// Transcript in order.
    pub messages: Vec<Message>,
    /// When the export was taken.
    pub export_date: DateTime<Utc>,
    /// Number of messages.
    pub total_messages: usize,
}

impl ChatExport {
    /// Snapshot of `messages` taken at `now`.
    #[must_use]
    pub fn new(messages: &[Message], now: DateTime<Utc>) -> Self {
        Self {
            messages: messages.to_vec(),
            export_date: now,
            total_messages: messages.len(),
        }
    }

    /// File name for this export, dated by the UTC export day.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("research-chat-{}.json", self.export_date.format("%Y-%m-%d"))
    }

    /// Write the document as pretty JSON into `dir`, creating it if needed.
    /// An export from the same day replaces the previous one.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_to(&self, dir: &Path) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}
