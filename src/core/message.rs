//! Chat messages.
//!
//! A conversation is a flat list of user prompts and assistant replies,
//! persisted as JSON by the history store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking for a caption.
    User,
    /// The generation backend.
    Assistant,
}

impl Role {
    /// Returns the role as a lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the chat history.
///
/// # Examples
///
/// ```
/// use caption_rs::core::{Message, Role};
///
/// let msg = Message::user("周末去露营");
/// assert_eq!(msg.role, Role::User);
/// assert!(msg.timestamp > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,

    /// Message text (Markdown for assistant replies).
    pub content: String,

    /// Unix timestamp in milliseconds; doubles as the message id.
    pub timestamp: i64,
}

impl Message {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: current_timestamp_millis(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Returns the current Unix timestamp in milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn current_timestamp_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "hi");

        let reply = Message::assistant("# 标题");
        assert_eq!(reply.role, Role::Assistant);
    }

    #[test]
    fn test_message_serialization_shape() {
        let msg = Message {
            role: Role::Assistant,
            content: "ok".to_string(),
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"role":"assistant","content":"ok","timestamp":1700000000000}"#
        );
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
