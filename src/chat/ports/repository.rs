//! Repository port for chat room and message persistence.

use crate::chat::domain::{ChatMessage, ChatMessageId, ChatRoom, ChatRoomId, RoomKey};
use crate::identity::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for chat repository operations.
pub type ChatRepositoryResult<T> = Result<T, ChatRepositoryError>;

/// Chat persistence contract.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Stores a newly opened room.
    ///
    /// # Errors
    ///
    /// Returns [`ChatRepositoryError::RoomExists`] when a room with the
    /// same provisioning key already exists (the caller lost a
    /// get-or-create race) and [`ChatRepositoryError::DuplicateRoom`]
    /// when the room ID already exists.
    async fn insert_room(&self, room: &ChatRoom) -> ChatRepositoryResult<()>;

    /// Finds a room by its exact provisioning key.
    ///
    /// Returns `None` when no room exists for the key. The lookup is
    /// directional; swapped creator/participant roles do not match.
    async fn find_room_by_key(&self, key: &RoomKey) -> ChatRepositoryResult<Option<ChatRoom>>;

    /// Finds a room by identifier.
    ///
    /// Returns `None` when the room does not exist.
    async fn find_room(&self, id: ChatRoomId) -> ChatRepositoryResult<Option<ChatRoom>>;

    /// Lists every room the user is a member of, newest first.
    async fn rooms_for_user(&self, user: UserId) -> ChatRepositoryResult<Vec<ChatRoom>>;

    /// Appends a message to its room.
    ///
    /// # Errors
    ///
    /// Returns [`ChatRepositoryError::RoomNotFound`] when the referenced
    /// room does not exist.
    async fn insert_message(&self, message: &ChatMessage) -> ChatRepositoryResult<()>;

    /// Lists a room's messages, oldest first.
    async fn list_messages(&self, room_id: ChatRoomId) -> ChatRepositoryResult<Vec<ChatMessage>>;
}

/// Errors returned by chat repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ChatRepositoryError {
    /// A room with the same identifier already exists.
    #[error("duplicate chat room identifier: {0}")]
    DuplicateRoom(ChatRoomId),

    /// A room with the same provisioning key already exists.
    #[error("chat room already exists for this task/creator/participant key")]
    RoomExists {
        /// The conflicting provisioning key.
        key: RoomKey,
    },

    /// The room was not found.
    #[error("chat room not found: {0}")]
    RoomNotFound(ChatRoomId),

    /// A message with the same identifier already exists.
    #[error("duplicate chat message identifier: {0}")]
    DuplicateMessage(ChatMessageId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChatRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
