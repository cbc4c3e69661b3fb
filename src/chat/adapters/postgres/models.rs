//! Diesel row models for chat persistence.

use super::schema::{chat_messages, chat_rooms};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result and insert row for chat rooms.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Insertable)]
#[diesel(table_name = chat_rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatRoomRow {
    /// Room identifier.
    pub id: uuid::Uuid,
    /// Task the conversation is about, when any.
    pub task_id: Option<uuid::Uuid>,
    /// User who initiated contact.
    pub creator_id: uuid::Uuid,
    /// User being contacted.
    pub participant_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result and insert row for chat messages.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Insertable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatMessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Room the message belongs to.
    pub room_id: uuid::Uuid,
    /// Sending user.
    pub sender_id: uuid::Uuid,
    /// Message body.
    pub message: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
