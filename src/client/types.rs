//! Wire types of the backend API.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Raw user text.
    pub message: String,
    /// Paths of server-backed files.
    pub files: Vec<String>,
    /// Route the query through the backend's tool-using agent.
    pub use_agent: bool,
}

impl ChatRequest {
    /// Agent-routed request.
    #[must_use]
    pub fn new(message: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            message: message.into(),
            files,
            use_agent: true,
        }
    }
}

/// Body returned by `POST /chat`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply; may be missing.
    #[serde(default)]
    pub response: Option<String>,
}

/// Descriptor returned by `POST /upload_file` and listed by `GET /files`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Name the backend stored the file under.
    pub filename: String,
    /// Backend path of the stored file.
    pub file_path: String,
    /// Stored size in bytes.
    pub file_size: u64,
}

/// Body returned by `GET /files`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileListResponse {
    /// Stored PDFs.
    #[serde(default)]
    pub files: Vec<UploadReceipt>,
}

/// Body returned by `GET /`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HealthResponse {
    /// Status line.
    #[serde(default)]
    pub message: String,
}
