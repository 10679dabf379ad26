//! Files selected for upload.

use std::path::Path;

use bytes::Bytes;

use crate::client::PDF_CONTENT_TYPE;

/// A file picked or dropped by the user, fully read into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateFile {
    /// Original file name.
    pub name: String,
    /// Detected content type.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl CandidateFile {
    /// Candidate with an explicit content type.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// PDF candidate.
    #[must_use]
    pub fn pdf(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(name, PDF_CONTENT_TYPE, bytes.into())
    }

    /// Read a file from disk; the content type is guessed from the extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, content_type, Bytes::from(bytes)))
    }

    /// True for `application/pdf`.
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Keep only PDFs, preserving order. Everything else is dropped silently.
#[must_use]
pub fn retain_pdfs(files: Vec<CandidateFile>) -> Vec<CandidateFile> {
    files.into_iter().filter(CandidateFile::is_pdf).collect()
}
