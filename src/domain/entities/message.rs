//! Chat message entity used as host content for the chat screen.

use chrono::{DateTime, Utc};

use super::Attachment;

/// Unique identifier for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A single chat message with optional media attachments.
#[derive(Debug, Clone)]
pub struct Message {
    id: MessageId,
    author: String,
    content: String,
    timestamp: DateTime<Utc>,
    attachments: Vec<Attachment>,
    outgoing: bool,
}

impl Message {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(id: MessageId, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            content: content.into(),
            timestamp: Utc::now(),
            attachments: Vec::new(),
            outgoing: false,
        }
    }

    /// Overrides the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Marks the message as sent by the local user.
    #[must_use]
    pub const fn outgoing(mut self) -> Self {
        self.outgoing = true;
        self
    }

    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    #[must_use]
    pub const fn is_outgoing(&self) -> bool {
        self.outgoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AttachmentKind;

    #[test]
    fn test_message_builder() {
        let msg = Message::new(MessageId(1), "alice", "hello")
            .with_attachment(Attachment::new(
                "https://example.com/pic.png",
                "pic.png",
                AttachmentKind::Image,
            ))
            .outgoing();

        assert_eq!(msg.author(), "alice");
        assert_eq!(msg.attachments().len(), 1);
        assert!(msg.is_outgoing());
    }
}
