//! Plain-text views of the session.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::client::UploadReceipt;
use crate::quick_actions::QuickAction;
use crate::session::{Message, MessageType, Role, UploadedFile};

/// Text shown while the assistant reply is pending.
pub const LOADING_TEXT: &str = "AI is researching...";

/// Number of file badges shown before collapsing into "+N more".
pub const VISIBLE_BADGES: usize = 3;

/// Render `ts` as HH:MM in its own time zone.
#[must_use]
pub fn format_time<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.format("%H:%M").to_string()
}

/// Render a message timestamp as local HH:MM.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    format_time(&ts.with_timezone(&Local))
}

/// Badges for the last three files, plus "+N more" when there are more.
#[must_use]
pub fn file_badges(files: &[UploadedFile]) -> Vec<String> {
    let hidden = files.len().saturating_sub(VISIBLE_BADGES);
    let mut badges: Vec<String> = files[hidden..].iter().map(|f| f.name.clone()).collect();
    if hidden > 0 {
        badges.push(format!("+{hidden} more"));
    }
    badges
}

fn kind_tag(kind: Option<MessageType>) -> &'static str {
    match kind {
        Some(MessageType::Search) => "search",
        Some(MessageType::Summary) => "summary",
        Some(MessageType::Comparison) => "compare",
        Some(MessageType::Citation) => "citations",
        Some(MessageType::General) | None => "assistant",
    }
}

/// One transcript entry.
#[must_use]
pub fn render_message(message: &Message, time: &str) -> String {
    match message.role {
        Role::User => format!("[{time}] you: {}", message.content),
        Role::Assistant if message.is_loading => format!("[{time}] {LOADING_TEXT}"),
        Role::Assistant => format!("[{time}] {}: {}", kind_tag(message.kind), message.content),
    }
}

/// One uploaded file.
#[must_use]
pub fn render_file(file: &UploadedFile) -> String {
    let origin = if file.is_server_file { "server" } else { "local" };
    format!("{} ({}, {origin})", file.name, human_size(file.size))
}

/// One file the backend stores.
#[must_use]
pub fn render_receipt(receipt: &UploadReceipt) -> String {
    format!(
        "{} ({}) at {}",
        receipt.filename,
        human_size(receipt.file_size),
        receipt.file_path
    )
}

/// One quick-action card.
#[must_use]
pub fn render_action(action: QuickAction, file_count: usize) -> String {
    let state = if action.is_enabled(file_count) {
        ""
    } else {
        " (needs uploaded files)"
    };
    format!(
        "{:<10} {}: {}{state}",
        action.name(),
        action.label(),
        action.description()
    )
}

#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / (KIB * KIB))
    }
}
