//! Chat message aggregate.

use super::{ChatDomainError, ChatMessageId, ChatRoomId};
use crate::identity::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A single message appended to a chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: ChatMessageId,
    room_id: ChatRoomId,
    sender_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedChatMessageData {
    /// Persisted message identifier.
    pub id: ChatMessageId,
    /// Persisted room reference.
    pub room_id: ChatRoomId,
    /// Persisted sender.
    pub sender_id: UserId,
    /// Persisted message body.
    pub body: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Composes a new message.
    ///
    /// # Errors
    ///
    /// Returns [`ChatDomainError::EmptyMessageBody`] when the body is
    /// empty after trimming.
    pub fn compose(
        room_id: ChatRoomId,
        sender_id: UserId,
        body: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ChatDomainError> {
        let raw = body.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChatDomainError::EmptyMessageBody);
        }
        Ok(Self {
            id: ChatMessageId::new(),
            room_id,
            sender_id,
            body: trimmed.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a message from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedChatMessageData) -> Self {
        Self {
            id: data.id,
            room_id: data.room_id,
            sender_id: data.sender_id,
            body: data.body,
            created_at: data.created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> ChatMessageId {
        self.id
    }

    /// Returns the room the message belongs to.
    #[must_use]
    pub const fn room_id(&self) -> ChatRoomId {
        self.room_id
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender_id(&self) -> UserId {
        self.sender_id
    }

    /// Returns the message body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
