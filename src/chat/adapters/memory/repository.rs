//! In-memory chat repository for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::chat::{
    domain::{ChatMessage, ChatRoom, ChatRoomId, RoomKey},
    ports::{ChatRepository, ChatRepositoryError, ChatRepositoryResult},
};
use crate::identity::UserId;

/// Thread-safe in-memory chat repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChatRepository {
    state: Arc<RwLock<ChatState>>,
}

#[derive(Debug, Default)]
struct ChatState {
    rooms: HashMap<ChatRoomId, ChatRoom>,
    key_index: HashMap<RoomKey, ChatRoomId>,
    messages: HashMap<ChatRoomId, Vec<ChatMessage>>,
}

impl InMemoryChatRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write_state(&self) -> ChatRepositoryResult<std::sync::RwLockWriteGuard<'_, ChatState>> {
        self.state.write().map_err(|err| {
            ChatRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_state(&self) -> ChatRepositoryResult<std::sync::RwLockReadGuard<'_, ChatState>> {
        self.state.read().map_err(|err| {
            ChatRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn insert_room(&self, room: &ChatRoom) -> ChatRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.rooms.contains_key(&room.id()) {
            return Err(ChatRepositoryError::DuplicateRoom(room.id()));
        }
        if state.key_index.contains_key(&room.key()) {
            return Err(ChatRepositoryError::RoomExists { key: room.key() });
        }
        state.key_index.insert(room.key(), room.id());
        state.rooms.insert(room.id(), room.clone());
        Ok(())
    }

    async fn find_room_by_key(&self, key: &RoomKey) -> ChatRepositoryResult<Option<ChatRoom>> {
        let state = self.read_state()?;
        let room = state
            .key_index
            .get(key)
            .and_then(|room_id| state.rooms.get(room_id))
            .cloned();
        Ok(room)
    }

    async fn find_room(&self, id: ChatRoomId) -> ChatRepositoryResult<Option<ChatRoom>> {
        let state = self.read_state()?;
        Ok(state.rooms.get(&id).cloned())
    }

    async fn rooms_for_user(&self, user: UserId) -> ChatRepositoryResult<Vec<ChatRoom>> {
        let state = self.read_state()?;
        let mut rooms: Vec<ChatRoom> = state
            .rooms
            .values()
            .filter(|room| room.is_member(user))
            .cloned()
            .collect();
        rooms.sort_by_key(|room| std::cmp::Reverse(room.created_at()));
        Ok(rooms)
    }

    async fn insert_message(&self, message: &ChatMessage) -> ChatRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.rooms.contains_key(&message.room_id()) {
            return Err(ChatRepositoryError::RoomNotFound(message.room_id()));
        }
        let room_messages = state.messages.entry(message.room_id()).or_default();
        if room_messages.iter().any(|stored| stored.id() == message.id()) {
            return Err(ChatRepositoryError::DuplicateMessage(message.id()));
        }
        room_messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, room_id: ChatRoomId) -> ChatRepositoryResult<Vec<ChatMessage>> {
        let state = self.read_state()?;
        Ok(state.messages.get(&room_id).cloned().unwrap_or_default())
    }
}
