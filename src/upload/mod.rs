//! PDF upload with bounded wait and local fallback.
//!
//! Every file in a batch is uploaded concurrently. Each upload gets the
//! configured timeout; when it elapses the request is dropped (which aborts it)
//! and the file is kept under a local handle instead. Backend errors take the
//! same fallback path.

pub mod candidate;
pub mod error;
pub mod handles;

pub use candidate::{CandidateFile, retain_pdfs};
pub use error::{UploadError, UploadResult};
pub use handles::{HANDLE_PREFIX, LocalHandleRegistry, is_local_handle};

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::client::{ClientError, ResearchBackend};
use crate::session::UploadedFile;

/// Runs upload batches against a backend.
#[derive(Clone)]
pub struct UploadCoordinator {
    backend: Arc<dyn ResearchBackend>,
    handles: LocalHandleRegistry,
    timeout: Duration,
}

impl std::fmt::Debug for UploadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("live_handles", &self.handles.live_count())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl UploadCoordinator {
    /// Coordinator sharing `handles` with the session that owns the files.
    #[must_use]
    pub fn new(
        backend: Arc<dyn ResearchBackend>,
        handles: LocalHandleRegistry,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            handles,
            timeout,
        }
    }

    /// Upload every file concurrently and describe the results in input order.
    ///
    /// # Errors
    /// Returns an error if any per-file task fails. Local handles allocated for
    /// the other files of the batch are released first.
    pub async fn upload_batch(&self, files: Vec<CandidateFile>) -> UploadResult<Vec<UploadedFile>> {
        let tasks: Vec<_> = files
            .into_iter()
            .map(|file| {
                let backend = Arc::clone(&self.backend);
                let handles = self.handles.clone();
                let timeout = self.timeout;
                tokio::spawn(async move { upload_one(backend.as_ref(), &handles, timeout, file).await })
            })
            .collect();

        let mut uploaded = Vec::with_capacity(tasks.len());
        let mut failure = None;
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(file) => uploaded.push(file),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        if let Some(err) = failure {
            let released = uploaded
                .iter()
                .filter(|f| !f.is_server_file && self.handles.release(&f.path))
                .count();
            debug!(released, "Released handles of failed batch");
            return Err(err.into());
        }

        let local = uploaded.iter().filter(|f| !f.is_server_file).count();
        info!(
            total = uploaded.len(),
            local, "Upload batch finished"
        );
        Ok(uploaded)
    }
}

async fn upload_one(
    backend: &dyn ResearchBackend,
    handles: &LocalHandleRegistry,
    timeout: Duration,
    file: CandidateFile,
) -> UploadedFile {
    let attempt = tokio::time::timeout(timeout, backend.upload_file(&file.name, file.bytes.clone()))
        .await
        .unwrap_or(Err(ClientError::Timeout));

    match attempt {
        Ok(receipt) => {
            info!(file = %file.name, path = %receipt.file_path, "Uploaded to backend");
            UploadedFile::server(receipt.filename, receipt.file_path, receipt.file_size)
        }
        Err(err) => {
            warn!(file = %file.name, error = %err, "Upload failed, keeping file locally");
            let size = file.size();
            let handle = handles.allocate(file.bytes);
            UploadedFile::local(file.name, handle, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::client::{ChatRequest, ChatResponse, ClientResult, UploadReceipt};

    /// Accepts files whose name starts with `ok`, hangs on `slow`, rejects the
    /// rest, and panics on `boom`.
    struct ScriptedUploads;

    #[async_trait]
    impl ResearchBackend for ScriptedUploads {
        async fn chat(&self, _request: &ChatRequest) -> ClientResult<ChatResponse> {
            unreachable!()
        }

        #[allow(clippy::panic)]
        async fn upload_file(&self, file_name: &str, bytes: Bytes) -> ClientResult<UploadReceipt> {
            if file_name.starts_with("ok") {
                Ok(UploadReceipt {
                    filename: file_name.to_string(),
                    file_path: format!("/uploads/{file_name}"),
                    file_size: bytes.len() as u64,
                })
            } else if file_name.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(60)).await;
                unreachable!()
            } else if file_name.starts_with("boom") {
                panic!("upload task crashed")
            } else {
                Err(ClientError::Status {
                    status: 500,
                    body: "disk full".into(),
                })
            }
        }

        async fn delete_file(&self, _stored_name: &str) -> ClientResult<()> {
            Ok(())
        }

        async fn list_files(&self) -> ClientResult<Vec<UploadReceipt>> {
            Ok(vec![])
        }

        async fn health(&self) -> ClientResult<String> {
            Ok(String::new())
        }
    }

    fn coordinator() -> (UploadCoordinator, LocalHandleRegistry) {
        let handles = LocalHandleRegistry::new();
        let coordinator = UploadCoordinator::new(
            Arc::new(ScriptedUploads),
            handles.clone(),
            Duration::from_secs(6),
        );
        (coordinator, handles)
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_batch_keeps_order_and_falls_back() {
        let (coordinator, handles) = coordinator();
        let batch = vec![
            CandidateFile::pdf("ok-1.pdf", Bytes::from_static(b"aaaa")),
            CandidateFile::pdf("slow.pdf", Bytes::from_static(b"bb")),
            CandidateFile::pdf("rejected.pdf", Bytes::from_static(b"c")),
        ];

        let started = tokio::time::Instant::now();
        let files = coordinator.upload_batch(batch).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(6));
        assert!(started.elapsed() < Duration::from_secs(60));
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["ok-1.pdf", "slow.pdf", "rejected.pdf"]);

        assert!(files[0].is_server_file);
        assert_eq!(files[0].path, "/uploads/ok-1.pdf");
        assert_eq!(files[0].size, 4);

        assert!(!files[1].is_server_file);
        assert!(is_local_handle(&files[1].path));
        assert_eq!(files[1].size, 2);
        assert!(!files[2].is_server_file);
        assert_eq!(handles.live_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_accepted_allocates_no_handles() {
        let (coordinator, handles) = coordinator();
        let batch = vec![
            CandidateFile::pdf("ok-a.pdf", Bytes::from_static(b"1")),
            CandidateFile::pdf("ok-b.pdf", Bytes::from_static(b"2")),
        ];

        let files = coordinator.upload_batch(batch).await.unwrap();
        assert!(files.iter().all(|f| f.is_server_file));
        assert_eq!(handles.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_failure_fails_batch_and_releases_handles() {
        let (coordinator, handles) = coordinator();
        let batch = vec![
            CandidateFile::pdf("rejected.pdf", Bytes::from_static(b"1")),
            CandidateFile::pdf("boom.pdf", Bytes::from_static(b"2")),
        ];

        let err = coordinator.upload_batch(batch).await.unwrap_err();
        assert!(matches!(err, UploadError::TaskFailed(_)));
        assert_eq!(handles.live_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (coordinator, _handles) = coordinator();
        assert!(coordinator.upload_batch(vec![]).await.unwrap().is_empty());
    }
}
