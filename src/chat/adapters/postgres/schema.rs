//! Diesel schema for chat persistence.
//!
//! The backing migration enforces get-or-create provisioning with a
//! unique index `idx_chat_rooms_key_unique` on (`task_id`, `creator_id`,
//! `participant_id`), declared `NULLS NOT DISTINCT` so task-less rooms
//! dedupe too.

diesel::table! {
    /// Provisioned chat rooms.
    chat_rooms (id) {
        /// Room identifier.
        id -> Uuid,
        /// Task the conversation is about, when any.
        task_id -> Nullable<Uuid>,
        /// User who initiated contact.
        creator_id -> Uuid,
        /// User being contacted.
        participant_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Messages appended to chat rooms.
    chat_messages (id) {
        /// Message identifier.
        id -> Uuid,
        /// Room the message belongs to.
        room_id -> Uuid,
        /// Sending user.
        sender_id -> Uuid,
        /// Message body.
        message -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(chat_messages -> chat_rooms (room_id));
diesel::allow_tables_to_appear_in_same_query!(chat_rooms, chat_messages);
