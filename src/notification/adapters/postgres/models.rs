//! Diesel row models for notification persistence.

use super::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for notification records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient.
    pub user_id: uuid::Uuid,
    /// Rendered title.
    pub title: String,
    /// Rendered message.
    pub message: String,
    /// Severity.
    pub kind: String,
    /// Read flag.
    pub read: bool,
    /// Referenced entity identifier.
    pub related_id: uuid::Uuid,
    /// Referenced entity kind.
    pub related_type: String,
    /// Triggering lifecycle event.
    pub event: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient.
    pub user_id: uuid::Uuid,
    /// Rendered title.
    pub title: String,
    /// Rendered message.
    pub message: String,
    /// Severity.
    pub kind: String,
    /// Read flag.
    pub read: bool,
    /// Referenced entity identifier.
    pub related_id: uuid::Uuid,
    /// Referenced entity kind.
    pub related_type: String,
    /// Triggering lifecycle event.
    pub event: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
