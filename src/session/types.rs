//! Core types for chat messages and uploaded files.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the user.
    User,
    /// Produced by the backend or synthesized locally.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display category of an assistant reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Web search results.
    Search,
    /// PDF summary.
    Summary,
    /// Document comparison.
    Comparison,
    /// Ranked citations.
    Citation,
    /// Anything else.
    General,
}

impl MessageType {
    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Summary => "summary",
            Self::Comparison => "comparison",
            Self::Citation => "citation",
            Self::General => "general",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A single chat record.
///
/// The JSON shape is shared with the persisted chat-history slot and the
/// export document, so field names stay camelCase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique per session, derived from the creation time.
    pub id: String,
    /// Message body (empty while loading).
    pub content: String,
    /// Author.
    pub role: Role,
    /// Creation time, refreshed when a placeholder is resolved.
    pub timestamp: DateTime<Utc>,
    /// Set on the assistant placeholder until the backend answers.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_loading: bool,
    /// Display category; absent on user messages and pending placeholders.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageType>,
}

impl Message {
    /// Message typed by the user.
    #[must_use]
    pub fn user(id: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role: Role::User,
            timestamp: now,
            is_loading: false,
            kind: None,
        }
    }

    /// Empty assistant message waiting for a backend reply.
    #[must_use]
    pub fn placeholder(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: String::new(),
            role: Role::Assistant,
            timestamp: now,
            is_loading: true,
            kind: None,
        }
    }

    /// Finished assistant message.
    #[must_use]
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        kind: MessageType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role: Role::Assistant,
            timestamp: now,
            is_loading: false,
            kind: Some(kind),
        }
    }

    /// Placeholder filled with a backend reply.
    #[must_use]
    pub fn resolved(self, content: String, kind: MessageType, now: DateTime<Utc>) -> Self {
        Self {
            content,
            timestamp: now,
            is_loading: false,
            kind: Some(kind),
            ..self
        }
    }

    /// Placeholder filled with an error text. The timestamp is kept.
    #[must_use]
    pub fn failed(self, content: &str) -> Self {
        Self {
            content: content.to_string(),
            is_loading: false,
            kind: Some(MessageType::General),
            ..self
        }
    }
}

/// Descriptor of an uploaded PDF.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Display name; also the removal key.
    pub name: String,
    /// Server-relative path or local handle.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// True when the backend accepted the upload.
    pub is_server_file: bool,
}

impl UploadedFile {
    /// Descriptor for a file the backend stored.
    #[must_use]
    pub fn server(name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            is_server_file: true,
        }
    }

    /// Descriptor for a file only reachable through a local handle.
    #[must_use]
    pub fn local(name: impl Into<String>, handle: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: handle.into(),
            size,
            is_server_file: false,
        }
    }

    /// Storage key the backend knows this file by.
    ///
    /// `Some` only when the path starts with `prefix`; the key is the final
    /// path segment.
    #[must_use]
    pub fn stored_name(&self, prefix: &str) -> Option<&str> {
        if !self.path.starts_with(prefix) {
            return None;
        }
        self.path.rsplit('/').next().filter(|segment| !segment.is_empty())
    }
}
