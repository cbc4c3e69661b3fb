//! Diesel schema for notification persistence.
//!
//! The backing migration enforces dispatch idempotency with a unique
//! index `idx_notifications_dispatch_unique` on (`user_id`, `related_id`,
//! `related_type`, `event`).

diesel::table! {
    /// Stored lifecycle notifications.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient.
        user_id -> Uuid,
        /// Rendered title.
        #[max_length = 255]
        title -> Varchar,
        /// Rendered message.
        message -> Text,
        /// Severity.
        #[sql_name = "type"]
        #[max_length = 20]
        kind -> Varchar,
        /// Read flag; flipped once by the recipient.
        read -> Bool,
        /// Referenced entity identifier.
        related_id -> Uuid,
        /// Referenced entity kind.
        #[max_length = 20]
        related_type -> Varchar,
        /// Triggering lifecycle event.
        #[max_length = 40]
        event -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
