//! `PostgreSQL` repository implementation for chat persistence.

use super::{
    models::{ChatMessageRow, ChatRoomRow},
    schema::{chat_messages, chat_rooms},
};
use crate::chat::{
    domain::{
        ChatMessage, ChatMessageId, ChatRoom, ChatRoomId, PersistedChatMessageData,
        PersistedChatRoomData, RoomKey,
    },
    ports::{ChatRepository, ChatRepositoryError, ChatRepositoryResult},
};
use crate::identity::UserId;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by chat adapters.
pub type ChatPgPool = Pool<ConnectionManager<PgConnection>>;

/// Unique index enforcing one room per provisioning key.
const ROOM_KEY_INDEX: &str = "idx_chat_rooms_key_unique";

/// `PostgreSQL`-backed chat repository.
#[derive(Debug, Clone)]
pub struct PostgresChatRepository {
    pool: ChatPgPool,
}

impl PostgresChatRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ChatPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ChatRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ChatRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ChatRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ChatRepositoryError::persistence)?
    }
}

#[async_trait]
impl ChatRepository for PostgresChatRepository {
    async fn insert_room(&self, room: &ChatRoom) -> ChatRepositoryResult<()> {
        let room_id = room.id();
        let key = room.key();
        let row = room_to_row(room);
        self.run_blocking(move |connection| {
            diesel::insert_into(chat_rooms::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_room_key_violation(info.as_ref()) =>
                    {
                        ChatRepositoryError::RoomExists { key }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ChatRepositoryError::DuplicateRoom(room_id)
                    }
                    _ => ChatRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_room_by_key(&self, key: &RoomKey) -> ChatRepositoryResult<Option<ChatRoom>> {
        let lookup = *key;
        self.run_blocking(move |connection| {
            let mut query = chat_rooms::table
                .filter(chat_rooms::creator_id.eq(lookup.creator_id.into_inner()))
                .filter(chat_rooms::participant_id.eq(lookup.participant_id.into_inner()))
                .select(ChatRoomRow::as_select())
                .into_boxed();
            query = match lookup.task_id {
                Some(task_id) => query.filter(chat_rooms::task_id.eq(task_id.into_inner())),
                None => query.filter(chat_rooms::task_id.is_null()),
            };
            let row = query
                .first::<ChatRoomRow>(connection)
                .optional()
                .map_err(ChatRepositoryError::persistence)?;
            row.map(row_to_room).transpose()
        })
        .await
    }

    async fn find_room(&self, id: ChatRoomId) -> ChatRepositoryResult<Option<ChatRoom>> {
        self.run_blocking(move |connection| {
            let row = chat_rooms::table
                .filter(chat_rooms::id.eq(id.into_inner()))
                .select(ChatRoomRow::as_select())
                .first::<ChatRoomRow>(connection)
                .optional()
                .map_err(ChatRepositoryError::persistence)?;
            row.map(row_to_room).transpose()
        })
        .await
    }

    async fn rooms_for_user(&self, user: UserId) -> ChatRepositoryResult<Vec<ChatRoom>> {
        self.run_blocking(move |connection| {
            let rows = chat_rooms::table
                .filter(
                    chat_rooms::creator_id
                        .eq(user.into_inner())
                        .or(chat_rooms::participant_id.eq(user.into_inner())),
                )
                .order(chat_rooms::created_at.desc())
                .select(ChatRoomRow::as_select())
                .load::<ChatRoomRow>(connection)
                .map_err(ChatRepositoryError::persistence)?;
            rows.into_iter().map(row_to_room).collect()
        })
        .await
    }

    async fn insert_message(&self, message: &ChatMessage) -> ChatRepositoryResult<()> {
        let message_id = message.id();
        let room_id = message.room_id();
        let row = message_to_row(message);
        self.run_blocking(move |connection| {
            diesel::insert_into(chat_messages::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ChatRepositoryError::RoomNotFound(room_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ChatRepositoryError::DuplicateMessage(message_id)
                    }
                    _ => ChatRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_messages(&self, room_id: ChatRoomId) -> ChatRepositoryResult<Vec<ChatMessage>> {
        self.run_blocking(move |connection| {
            let rows = chat_messages::table
                .filter(chat_messages::room_id.eq(room_id.into_inner()))
                .order(chat_messages::created_at.asc())
                .select(ChatMessageRow::as_select())
                .load::<ChatMessageRow>(connection)
                .map_err(ChatRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_message).collect())
        })
        .await
    }
}

fn is_room_key_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == ROOM_KEY_INDEX)
}

fn room_to_row(room: &ChatRoom) -> ChatRoomRow {
    ChatRoomRow {
        id: room.id().into_inner(),
        task_id: room.task_id().map(TaskId::into_inner),
        creator_id: room.creator_id().into_inner(),
        participant_id: room.participant_id().into_inner(),
        created_at: room.created_at(),
    }
}

fn row_to_room(row: ChatRoomRow) -> ChatRepositoryResult<ChatRoom> {
    let key = RoomKey::new(
        row.task_id.map(TaskId::from_uuid),
        UserId::from_uuid(row.creator_id),
        UserId::from_uuid(row.participant_id),
    )
    .map_err(ChatRepositoryError::persistence)?;
    Ok(ChatRoom::from_persisted(PersistedChatRoomData {
        id: ChatRoomId::from_uuid(row.id),
        key,
        created_at: row.created_at,
    }))
}

fn message_to_row(message: &ChatMessage) -> ChatMessageRow {
    ChatMessageRow {
        id: message.id().into_inner(),
        room_id: message.room_id().into_inner(),
        sender_id: message.sender_id().into_inner(),
        message: message.body().to_owned(),
        created_at: message.created_at(),
    }
}

fn row_to_message(row: ChatMessageRow) -> ChatMessage {
    ChatMessage::from_persisted(PersistedChatMessageData {
        id: ChatMessageId::from_uuid(row.id),
        room_id: ChatRoomId::from_uuid(row.room_id),
        sender_id: UserId::from_uuid(row.sender_id),
        body: row.message,
        created_at: row.created_at,
    })
}
