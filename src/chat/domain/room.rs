//! Chat room aggregate and its directional provisioning key.

use super::{ChatDomainError, ChatRoomId};
use crate::identity::UserId;
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Directional provisioning key for a chat room.
///
/// The creator/participant direction records who initiated contact; the
/// same two users in swapped roles address a different room on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomKey {
    /// Task the conversation is about, when any.
    pub task_id: Option<TaskId>,
    /// User who initiated contact.
    pub creator_id: UserId,
    /// User being contacted.
    pub participant_id: UserId,
}

impl RoomKey {
    /// Creates a validated room key.
    ///
    /// # Errors
    ///
    /// Returns [`ChatDomainError::SelfConversation`] when both sides are
    /// the same user.
    pub const fn new(
        task_id: Option<TaskId>,
        creator_id: UserId,
        participant_id: UserId,
    ) -> Result<Self, ChatDomainError> {
        // Uuid lacks const PartialEq; compare through the byte view.
        if creator_id.into_inner().as_u128() == participant_id.into_inner().as_u128() {
            return Err(ChatDomainError::SelfConversation);
        }
        Ok(Self {
            task_id,
            creator_id,
            participant_id,
        })
    }
}

/// Chat room aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    id: ChatRoomId,
    key: RoomKey,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted chat room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedChatRoomData {
    /// Persisted room identifier.
    pub id: ChatRoomId,
    /// Persisted provisioning key.
    pub key: RoomKey,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    /// Opens a new room for the given key.
    #[must_use]
    pub fn open(key: RoomKey, clock: &impl Clock) -> Self {
        Self {
            id: ChatRoomId::new(),
            key,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a room from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedChatRoomData) -> Self {
        Self {
            id: data.id,
            key: data.key,
            created_at: data.created_at,
        }
    }

    /// Returns the room identifier.
    #[must_use]
    pub const fn id(&self) -> ChatRoomId {
        self.id
    }

    /// Returns the provisioning key.
    #[must_use]
    pub const fn key(&self) -> RoomKey {
        self.key
    }

    /// Returns the task the conversation is about, when any.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.key.task_id
    }

    /// Returns the user who initiated contact.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.key.creator_id
    }

    /// Returns the user being contacted.
    #[must_use]
    pub const fn participant_id(&self) -> UserId {
        self.key.participant_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when the user is one of the room's two members.
    #[must_use]
    pub fn is_member(&self, user: UserId) -> bool {
        self.key.creator_id == user || self.key.participant_id == user
    }
}
