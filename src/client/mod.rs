//! Backend API client.
//!
//! Endpoints:
//! - `POST /chat`: agent-routed chat completion
//! - `POST /upload_file`: multipart PDF upload
//! - `DELETE /file/{storedName}`: remove a stored PDF
//! - `GET /files`: list stored PDFs
//! - `GET /`: liveness message

pub mod error;
pub mod types;

pub use error::{ClientError, ClientResult};
pub use types::{ChatRequest, ChatResponse, FileListResponse, HealthResponse, UploadReceipt};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

/// Content type sent with every upload.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Operations the session needs from the backend.
///
/// `HttpBackend` is the production implementation; tests substitute scripted
/// fakes.
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    /// Send one chat turn.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse>;

    /// Upload one PDF as the multipart field `file`.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    async fn upload_file(&self, file_name: &str, bytes: Bytes) -> ClientResult<UploadReceipt>;

    /// Delete a stored PDF by its storage key.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    async fn delete_file(&self, stored_name: &str) -> ClientResult<()>;

    /// List the PDFs the backend holds.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    async fn list_files(&self) -> ClientResult<Vec<UploadReceipt>>;

    /// Liveness check.
    ///
    /// # Errors
    /// Returns an error when the backend is unreachable.
    async fn health(&self) -> ClientResult<String>;
}

/// reqwest-backed implementation of [`ResearchBackend`].
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    ///
    /// No request timeout is configured: chat turns may run as long as the
    /// backend's agent needs. Uploads are bounded by the caller.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("research-assistant/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .deflate(true)
            .build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fail on non-success statuses, keeping the body for diagnostics.
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ResearchBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        tracing::debug!(files = request.files.len(), "POST /chat");
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn upload_file(&self, file_name: &str, bytes: Bytes) -> ClientResult<UploadReceipt> {
        tracing::debug!(file = file_name, size = bytes.len(), "POST /upload_file");
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(PDF_CONTENT_TYPE)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload_file"))
            .multipart(form)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn delete_file(&self, stored_name: &str) -> ClientResult<()> {
        let path = format!("file/{}", urlencoding::encode(stored_name));
        tracing::debug!("DELETE /{path}");
        let response = self.client.delete(self.endpoint(&path)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn list_files(&self) -> ClientResult<Vec<UploadReceipt>> {
        let response = self.client.get(self.endpoint("files")).send().await?;
        let listing: FileListResponse = Self::read_json(response).await?;
        Ok(listing.files)
    }

    async fn health(&self) -> ClientResult<String> {
        let response = self.client.get(self.endpoint("")).send().await?;
        let health: HealthResponse = Self::read_json(response).await?;
        Ok(health.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::extract::{Multipart, Path, State};
    use axum::http::StatusCode;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};

    #[derive(Default)]
    struct Recorded {
        chat_bodies: Vec<serde_json::Value>,
        uploads: Vec<(String, Option<String>, usize)>,
        deletes: Vec<String>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn chat(
        State(rec): State<Shared>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let reply = format!("echo: {}", body["message"].as_str().unwrap_or_default());
        rec.lock().unwrap().chat_bodies.push(body);
        Json(serde_json::json!({ "response": reply }))
    }

    async fn upload(
        State(rec): State<Shared>,
        mut multipart: Multipart,
    ) -> Result<Json<serde_json::Value>, StatusCode> {
        if let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
            let field_name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            rec.lock()
                .unwrap()
                .uploads
                .push((field_name, file_name.clone(), data.len()));
            let name = file_name.unwrap_or_default();
            return Ok(Json(serde_json::json!({
                "filename": name,
                "file_path": format!("/uploads/{name}"),
                "file_size": data.len(),
            })));
        }
        Err(StatusCode::BAD_REQUEST)
    }

    async fn remove(State(rec): State<Shared>, Path(name): Path<String>) -> StatusCode {
        rec.lock().unwrap().deletes.push(name.clone());
        if name == "missing.pdf" {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        }
    }

    async fn files() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "files": [{"filename": "a.pdf", "file_path": "/uploads/a.pdf", "file_size": 12}]
        }))
    }

    async fn root() -> Json<serde_json::Value> {
        Json(serde_json::json!({"message": "Research Assistant API is running!"}))
    }

    async fn spawn_backend() -> (String, Shared) {
        let rec = Shared::default();
        let app = Router::new()
            .route("/", get(root))
            .route("/chat", post(chat))
            .route("/upload_file", post(upload))
            .route("/file/{name}", delete(remove))
            .route("/files", get(files))
            .with_state(rec.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), rec)
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("localhost without scheme"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_joining() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.endpoint("chat"), "http://localhost:8000/chat");
        assert_eq!(backend.endpoint("/files"), "http://localhost:8000/files");
    }

    #[tokio::test]
    async fn test_chat_posts_agent_request() {
        let (url, rec) = spawn_backend().await;
        let backend = HttpBackend::new(&url).unwrap();

        let reply = backend
            .chat(&ChatRequest::new("What is quantum computing?", vec!["/uploads/a.pdf".into()]))
            .await
            .unwrap();

        assert_eq!(reply.response.as_deref(), Some("echo: What is quantum computing?"));
        let bodies = rec.lock().unwrap().chat_bodies.clone();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["use_agent"], true);
        assert_eq!(bodies[0]["files"], serde_json::json!(["/uploads/a.pdf"]));
    }

    #[tokio::test]
    async fn test_upload_sends_file_field() {
        let (url, rec) = spawn_backend().await;
        let backend = HttpBackend::new(&url).unwrap();

        let receipt = backend
            .upload_file("paper.pdf", Bytes::from_static(b"%PDF-1.7 test"))
            .await
            .unwrap();

        assert_eq!(receipt.filename, "paper.pdf");
        assert_eq!(receipt.file_path, "/uploads/paper.pdf");
        assert_eq!(receipt.file_size, 13);
        let uploads = rec.lock().unwrap().uploads.clone();
        assert_eq!(uploads, vec![("file".to_string(), Some("paper.pdf".to_string()), 13)]);
    }

    #[tokio::test]
    async fn test_delete_reports_status() {
        let (url, rec) = spawn_backend().await;
        let backend = HttpBackend::new(&url).unwrap();

        backend.delete_file("a.pdf").await.unwrap();
        let err = backend.delete_file("missing.pdf").await.unwrap_err();
        assert!(err.is_status());
        assert_eq!(rec.lock().unwrap().deletes, vec!["a.pdf", "missing.pdf"]);
    }

    #[tokio::test]
    async fn test_list_and_health() {
        let (url, _rec) = spawn_backend().await;
        let backend = HttpBackend::new(&url).unwrap();

        let files = backend.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_path, "/uploads/a.pdf");
        assert_eq!(
            backend.health().await.unwrap(),
            "Research Assistant API is running!"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{addr}")).unwrap();
        let err = backend.chat(&ChatRequest::new("hi", vec![])).await.unwrap_err();
        assert!(matches!(err, ClientError::HttpRequest(_)));
    }
}
