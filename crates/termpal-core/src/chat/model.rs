//! Chat domain model.

use super::message::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to a chat before its first user message arrives.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum number of characters of the first user message kept as the title.
pub const TITLE_MAX_CHARS: usize = 30;

/// A titled, timestamped, ordered sequence of messages, persisted as one
/// durable record.
///
/// Message order is append order and is never reordered. `created_at` is
/// fixed at creation; `updated_at` is bumped on every append and is the
/// sort key when listing chats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat identifier (UUID format), assigned at creation and
    /// never reused. Doubles as the durable record's key.
    pub id: String,
    /// Human-readable chat title.
    pub title: String,
    /// Messages in append order, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Timestamp when the chat was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent append.
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Creates an empty chat with the default title and both timestamps
    /// set to `now`.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derives a chat title from the first user message.
///
/// Takes the first [`TITLE_MAX_CHARS`] characters of `content` and appends
/// an ellipsis marker when the content is longer than that.
pub fn derive_title(content: &str) -> String {
    let title: String = content.chars().take(TITLE_MAX_CHARS).collect();
    if content.chars().count() > TITLE_MAX_CHARS {
        format!("{}...", title)
    } else {
        title
    }
}
