//! Chat room provisioning and message append/list.

use crate::chat::{
    domain::{ChatDomainError, ChatMessage, ChatRoom, ChatRoomId, RoomKey},
    ports::{ChatRepository, ChatRepositoryError},
};
use crate::identity::UserId;
use crate::task::domain::TaskId;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Service-level errors for chat operations.
#[derive(Debug, Error)]
pub enum ChatServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ChatDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ChatRepositoryError),
    /// No room exists with the given identifier.
    #[error("chat room {0} not found")]
    RoomNotFound(ChatRoomId),
    /// The acting user is not a member of the room.
    #[error("user {user} is not a member of chat room {room_id}")]
    NotAMember {
        /// Room being accessed.
        room_id: ChatRoomId,
        /// User who attempted the access.
        user: UserId,
    },
}

/// Result type for chat service operations.
pub type ChatServiceResult<T> = Result<T, ChatServiceError>;

/// Chat room provisioner and messaging service.
///
/// Rooms are provisioned lazily on first contact and keyed by the exact
/// directional (task, creator, participant) triple. Messaging is a plain
/// append-and-list with a membership check; no delivery guarantees.
#[derive(Clone)]
pub struct ChatService<R, C>
where
    R: ChatRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ChatService<R, C>
where
    R: ChatRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new chat service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the room for the given triple, creating it on first use.
    ///
    /// A creation that loses its race falls back to the winner's room, so
    /// the operation is idempotent and retry-safe.
    ///
    /// # Errors
    ///
    /// Returns [`ChatServiceError::Domain`] when creator and participant
    /// are the same user, or repository errors from the lookup.
    pub async fn open_room(
        &self,
        task_id: Option<TaskId>,
        creator_id: UserId,
        participant_id: UserId,
    ) -> ChatServiceResult<ChatRoom> {
        let key = RoomKey::new(task_id, creator_id, participant_id)?;
        if let Some(existing) = self.repository.find_room_by_key(&key).await? {
            return Ok(existing);
        }

        let room = ChatRoom::open(key, &*self.clock);
        match self.repository.insert_room(&room).await {
            Ok(()) => Ok(room),
            Err(ChatRepositoryError::RoomExists { .. }) => {
                debug!(creator = %creator_id, "lost room creation race; reusing winner");
                self.repository
                    .find_room_by_key(&key)
                    .await?
                    .ok_or_else(|| ChatRepositoryError::RoomExists { key }.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Appends a message to a room the sender is a member of.
    ///
    /// # Errors
    ///
    /// Returns [`ChatServiceError::RoomNotFound`] when the room does not
    /// exist, [`ChatServiceError::NotAMember`] when the sender is not one
    /// of its two members, and [`ChatServiceError::Domain`] when the body
    /// is empty.
    pub async fn send_message(
        &self,
        room_id: ChatRoomId,
        sender_id: UserId,
        body: impl Into<String> + Send,
    ) -> ChatServiceResult<ChatMessage> {
        let room = self.member_room(room_id, sender_id).await?;
        let message = ChatMessage::compose(room.id(), sender_id, body, &*self.clock)?;
        self.repository.insert_message(&message).await?;
        Ok(message)
    }

    /// Lists a room's messages for one of its members, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ChatServiceError::RoomNotFound`] or
    /// [`ChatServiceError::NotAMember`] with the semantics of
    /// [`ChatService::send_message`].
    pub async fn messages(
        &self,
        room_id: ChatRoomId,
        acting_user: UserId,
    ) -> ChatServiceResult<Vec<ChatMessage>> {
        self.member_room(room_id, acting_user).await?;
        Ok(self.repository.list_messages(room_id).await?)
    }

    /// Lists every room the user is a member of, newest first.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the lookup.
    pub async fn rooms_for_user(&self, user: UserId) -> ChatServiceResult<Vec<ChatRoom>> {
        Ok(self.repository.rooms_for_user(user).await?)
    }

    async fn member_room(
        &self,
        room_id: ChatRoomId,
        user: UserId,
    ) -> ChatServiceResult<ChatRoom> {
        let room = self
            .repository
            .find_room(room_id)
            .await?
            .ok_or(ChatServiceError::RoomNotFound(room_id))?;
        if !room.is_member(user) {
            return Err(ChatServiceError::NotAMember { room_id, user });
        }
        Ok(room)
    }
}
