//! Message identifiers.
//!
//! Ids are the creation time in epoch milliseconds, rendered as decimal text.
//! Two messages created in the same millisecond get consecutive values, so an
//! id is never handed out twice in a session. Once the numeric space is
//! exhausted (a history seeded with `i64::MAX`) ids fall back to random UUIDs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::Message;

/// Hands out time-derived, strictly increasing message ids.
#[derive(Debug, Default, Clone)]
pub struct MessageIdGenerator {
    last: i64,
}

impl MessageIdGenerator {
    /// Fresh generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Generator that continues after the ids already present in `messages`.
    ///
    /// Non-numeric ids (hand-edited history) are ignored.
    #[must_use]
    pub fn seeded_from(messages: &[Message]) -> Self {
        let last = messages
            .iter()
            .filter_map(|m| m.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    /// Next id for a message created at `now`.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> String {
        let candidate = now.timestamp_millis();
        let next = if candidate > self.last {
            Some(candidate)
        } else {
            self.last.checked_add(1)
        };
        let Some(id) = next else {
            return Uuid::new_v4().to_string();
        };
        self.last = id;
        id.to_string()
    }
}
