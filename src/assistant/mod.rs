//! Conversation controller and file lifecycle.
//!
//! [`ResearchAssistant`] owns one [`SessionState`] and is the only place it
//! changes. Each transition is followed by a save of the collection it touched.

pub mod export;

pub use export::{ChatExport, ExportError, ExportResult};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::client::{ChatRequest, ChatResponse, ClientResult, ResearchBackend, UploadReceipt};
use crate::config::AssistantConfig;
use crate::persistence::{Persistence, Slot};
use crate::quick_actions::apply_quick_action;
use crate::session::{
    Message, MessageClassifier, MessageIdGenerator, MessageType, SessionState, UploadedFile,
};
use crate::upload::{CandidateFile, LocalHandleRegistry, UploadCoordinator, retain_pdfs};

/// Content used when the backend reply has no text.
pub const NO_RESPONSE_TEXT: &str = "No response received";
/// Placeholder content after a failed chat exchange.
pub const CHAT_ERROR_TEXT: &str = "❌ Sorry, I encountered an error connecting to the server. Please make sure the backend is running and try again.";
/// Confirmation appended by [`ResearchAssistant::clear_files`].
pub const FILES_CLEARED_TEXT: &str = "🗑️ **All uploaded files have been cleared.**";

/// Confirmation appended after an upload batch.
#[must_use]
pub fn upload_confirmation(count: usize) -> String {
    format!("✅ **Uploaded {count} PDF file(s).**  Ready for summarising / comparing!")
}

/// Message appended when an upload batch fails as a whole.
#[must_use]
pub fn upload_error_text(err: &impl std::fmt::Display) -> String {
    format!("❌ **Upload Error:** {err}")
}

/// A chat exchange between [`ResearchAssistant::begin_send`] and
/// [`ResearchAssistant::complete_send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSend {
    /// Id of the loading placeholder to resolve.
    pub placeholder_id: String,
    /// Request to issue.
    pub request: ChatRequest,
}

/// Session controller.
pub struct ResearchAssistant {
    state: SessionState,
    backend: Arc<dyn ResearchBackend>,
    uploads: UploadCoordinator,
    handles: LocalHandleRegistry,
    persistence: Persistence,
    ids: MessageIdGenerator,
    classifier: MessageClassifier,
    upload_prefix: String,
    export_dir: Option<PathBuf>,
    input: String,
}

impl std::fmt::Debug for ResearchAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAssistant")
            .field("messages", &self.state.messages().len())
            .field("files", &self.state.files().len())
            .field("flags", &self.state.flags)
            .finish_non_exhaustive()
    }
}

impl ResearchAssistant {
    /// Create a session, restoring both collections from `persistence`.
    #[must_use]
    pub fn new(
        backend: Arc<dyn ResearchBackend>,
        persistence: Persistence,
        config: &AssistantConfig,
    ) -> Self {
        let messages: Vec<Message> = persistence.load(Slot::ChatHistory).unwrap_or_default();
        let files: Vec<UploadedFile> = persistence.load(Slot::UploadedFiles).unwrap_or_default();
        debug!(
            messages = messages.len(),
            files = files.len(),
            "Restored session"
        );

        let handles = LocalHandleRegistry::new();
        let uploads =
            UploadCoordinator::new(Arc::clone(&backend), handles.clone(), config.upload_timeout);
        let classifier = config
            .markers
            .clone()
            .map_or_else(MessageClassifier::default, MessageClassifier::new);
        let export_dir = match config.resolved_export_dir() {
            Ok(dir) => Some(dir),
            Err(err) => {
                warn!("Chat export disabled: {err}");
                None
            }
        };

        Self {
            ids: MessageIdGenerator::seeded_from(&messages),
            state: SessionState::restored(messages, files),
            backend,
            uploads,
            handles,
            persistence,
            classifier,
            upload_prefix: config.upload_prefix.clone(),
            export_dir,
            input: String::new(),
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Messages in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    /// Uploaded files in order.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        self.state.files()
    }

    /// True while a chat exchange or an upload batch is pending.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.state.flags.loading
    }

    /// Track a drag hovering over the input.
    pub fn set_drag_over(&mut self, drag_over: bool) {
        self.state.flags.drag_over = drag_over;
    }

    /// Local handle bindings of this session.
    #[must_use]
    pub const fn handles(&self) -> &LocalHandleRegistry {
        &self.handles
    }

    /// Input buffer.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Fill the input buffer from a quick action. Unknown names are ignored.
    pub fn quick_action(&mut self, name: &str) -> bool {
        apply_quick_action(name, self.state.files().len(), &mut self.input)
    }

    /// Start a chat exchange.
    ///
    /// Appends the user message and a loading placeholder, clears the input
    /// and sets the loading flag. Returns `None` (and changes nothing) for
    /// blank text or while another exchange is pending.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() || self.state.flags.loading {
            return None;
        }

        let now = Utc::now();
        let user = Message::user(self.ids.next_at(now), text, now);
        let placeholder = Message::placeholder(self.ids.next_at(now), now);
        let placeholder_id = placeholder.id.clone();

        self.state.append_messages([user, placeholder]);
        self.input.clear();
        self.state.flags.loading = true;
        self.save_messages();

        Some(PendingSend {
            placeholder_id,
            request: ChatRequest::new(text, self.state.server_file_paths()),
        })
    }

    /// Resolve the placeholder of `pending` with the backend outcome and
    /// clear the loading flag.
    pub fn complete_send(&mut self, pending: PendingSend, outcome: ClientResult<ChatResponse>) {
        let PendingSend { placeholder_id, .. } = pending;
        let found = match outcome {
            Ok(reply) => {
                let content = reply
                    .response
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string());
                let kind = self.classifier.classify(&content);
                debug!(%kind, "Chat reply received");
                let now = Utc::now();
                self.state.replace_message(&placeholder_id, |msg| {
                    msg.resolved(content, kind, now)
                })
            }
            Err(err) => {
                warn!("Chat request failed: {err}");
                self.state
                    .replace_message(&placeholder_id, |msg| msg.failed(CHAT_ERROR_TEXT))
            }
        };
        if !found {
            debug!(id = %placeholder_id, "Placeholder gone before reply");
        }

        self.state.flags.loading = false;
        self.save_messages();
    }

    /// Run a whole chat exchange. Returns `false` when nothing was sent.
    pub async fn send_message(&mut self, text: &str) -> bool {
        let Some(pending) = self.begin_send(text) else {
            return false;
        };
        let outcome = self.backend.chat(&pending.request).await;
        self.complete_send(pending, outcome);
        true
    }

    /// Send the input buffer as-is.
    pub async fn send_input(&mut self) -> bool {
        let text = self.input.clone();
        self.send_message(&text).await
    }

    /// Upload a batch of picked or dropped files.
    ///
    /// Non-PDF entries are dropped; an all-dropped batch changes nothing.
    /// The loading flag is raised for the batch and then put back as it was,
    /// so a chat exchange pending across the upload stays pending.
    /// Returns the number of files added.
    pub async fn upload_files(&mut self, candidates: Vec<CandidateFile>) -> usize {
        let pdfs = retain_pdfs(candidates);
        if pdfs.is_empty() {
            debug!("No PDF in upload batch");
            return 0;
        }

        let was_loading = self.state.flags.loading;
        self.state.flags.loading = true;
        let outcome = self.uploads.upload_batch(pdfs).await;
        self.state.flags.loading = was_loading;

        let (content, added) = match outcome {
            Ok(files) => {
                let count = files.len();
                self.state.append_files(files);
                self.save_files();
                (upload_confirmation(count), count)
            }
            Err(err) => {
                error!("Upload batch failed: {err}");
                (upload_error_text(&err), 0)
            }
        };

        let now = Utc::now();
        let message = Message::assistant(self.ids.next_at(now), content, MessageType::General, now);
        self.state.append_messages([message]);
        self.save_messages();
        added
    }

    /// Remove every file named `name`.
    ///
    /// The file leaves the session before the backend is contacted; a failed
    /// delete is only logged. Returns `false` when no file had that name.
    pub async fn remove_file(&mut self, name: &str) -> bool {
        let removed = self.state.remove_files_named(name);
        if removed.is_empty() {
            return false;
        }

        if self.state.files().is_empty() {
            self.persistence.clear(Slot::UploadedFiles);
        } else {
            self.save_files();
        }

        for file in &removed {
            self.discard(file).await;
        }
        true
    }

    /// Remove every file, release every local handle, and confirm in the chat.
    pub async fn clear_files(&mut self) {
        let files = self.state.take_files();
        let (server, local): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| f.is_server_file);

        let deletes = server.iter().filter_map(|file| {
            let stored = file.stored_name(&self.upload_prefix)?;
            let backend = Arc::clone(&self.backend);
            Some(async move {
                if let Err(err) = backend.delete_file(stored).await {
                    warn!(file = %file.name, "Failed to delete from backend: {err}");
                }
            })
        });
        join_all(deletes).await;

        for file in &local {
            self.release(file);
        }

        self.persistence.clear(Slot::UploadedFiles);
        let now = Utc::now();
        let confirmation = Message::assistant(
            self.ids.next_at(now),
            FILES_CLEARED_TEXT,
            MessageType::General,
            now,
        );
        self.state.append_messages([confirmation]);
        self.save_messages();
        info!(
            server = server.len(),
            local = local.len(),
            "Cleared uploaded files"
        );
    }

    /// Drop the transcript and its persisted slot.
    pub fn clear_chat(&mut self) {
        self.state.clear_messages();
        self.persistence.clear(Slot::ChatHistory);
    }

    /// Write the transcript to the export directory, or to `dir` when given.
    ///
    /// Returns the path written.
    pub fn export_chat(&self, dir: Option<&Path>) -> ExportResult<PathBuf> {
        if self.state.messages().is_empty() {
            return Err(ExportError::NothingToExport);
        }
        let dir = dir
            .or_else(|| self.export_dir.as_deref())
            .ok_or(ExportError::NoDirectory)?;
        let path = ChatExport::new(self.state.messages(), Utc::now()).write_to(dir)?;
        info!("Exported chat to {}", path.display());
        Ok(path)
    }

    /// Files the backend currently stores.
    pub async fn server_files(&self) -> ClientResult<Vec<UploadReceipt>> {
        self.backend.list_files().await
    }

    /// Backend liveness message.
    pub async fn health(&self) -> ClientResult<String> {
        self.backend.health().await
    }

    /// Free whatever backs a removed descriptor.
    async fn discard(&self, file: &UploadedFile) {
        if let Some(stored) = file.stored_name(&self.upload_prefix) {
            if let Err(err) = self.backend.delete_file(stored).await {
                warn!(file = %file.name, "Failed to delete from backend: {err}");
            }
        } else {
            self.release(file);
        }
    }

    fn release(&self, file: &UploadedFile) {
        if !self.handles.release(&file.path) {
            debug!(file = %file.name, "No live local handle to release");
        }
    }

    fn save_messages(&self) {
        self.persistence
            .save_non_empty(Slot::ChatHistory, self.state.messages());
    }

    fn save_files(&self) {
        self.persistence
            .save_non_empty(Slot::UploadedFiles, self.state.files());
    }
}
