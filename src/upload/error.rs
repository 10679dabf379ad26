//! Upload batch errors.

use thiserror::Error;

/// Failure of a batch as a whole.
///
/// Individual files never fail a batch: a file the backend does not accept in
/// time falls back to a local handle. Only a broken per-file task does.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A per-file upload task panicked or was cancelled.
    #[error("upload task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Convenience result alias for uploads.
pub type UploadResult<T> = Result<T, UploadError>;
