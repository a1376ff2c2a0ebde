//! Message domain
//!
//! Short posts authored by a user. Only what the directory needs: authorship,
//! text and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Maximum message length, matching the `messages.text` column
pub const MAX_MESSAGE_LENGTH: usize = 140;

/// Numeric message identifier allocated from the `messages` id sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    text: String,
    timestamp: DateTime<Utc>,
    user_id: UserId,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(id: MessageId, text: impl Into<String>, user_id: UserId) -> Self {
        Self::with_timestamp(id, text, user_id, Utc::now())
    }

    pub fn with_timestamp(
        id: MessageId,
        text: impl Into<String>,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp,
            user_id,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Validate message text: non-blank and at most 140 characters
pub fn validate_message_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::validation("Message text cannot be empty"));
    }

    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(DomainError::validation(format!(
            "Message text exceeds maximum length of {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let message = Message::new(MessageId::new(1), "hello warbler", UserId::new(9));

        assert_eq!(message.id().value(), 1);
        assert_eq!(message.text(), "hello warbler");
        assert_eq!(message.user_id(), UserId::new(9));
        assert!(message.timestamp() <= Utc::now());
    }

    #[test]
    fn test_validate_message_text() {
        assert!(validate_message_text("hi").is_ok());
        assert!(validate_message_text(&"a".repeat(140)).is_ok());

        assert!(validate_message_text("").is_err());
        assert!(validate_message_text("   ").is_err());
        assert!(validate_message_text(&"a".repeat(141)).is_err());
    }
}
