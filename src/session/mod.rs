//! Session data model.
//!
//! Everything a single client session owns lives here:
//! - chat messages and their display categories
//! - uploaded-file descriptors (server-backed or local-only)
//! - the ephemeral UI flags that are never persisted
//! - message id generation and reply classification

pub mod classify;
pub mod ids;
pub mod state;
pub mod types;

pub use classify::{MarkerRule, MessageClassifier};
pub use ids::MessageIdGenerator;
pub use state::{SessionState, UiFlags};
pub use types::{Message, MessageType, Role, UploadedFile};
