//! Store port for notification persistence.

use crate::identity::UserId;
use crate::notification::domain::{Notification, NotificationId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification store operations.
pub type NotificationStoreResult<T> = Result<T, NotificationStoreError>;

/// Notification persistence contract.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Stores a notification unless one with the same idempotency key
    /// (recipient, related entity, triggering event) already exists.
    ///
    /// Returns `true` when the notification was stored and `false` when
    /// an existing notification made the dispatch a no-op.
    async fn insert_if_absent(
        &self,
        notification: &Notification,
    ) -> NotificationStoreResult<bool>;

    /// Lists the recipient's notifications, newest first.
    async fn list_for_user(&self, user: UserId) -> NotificationStoreResult<Vec<Notification>>;

    /// Counts the recipient's unread notifications.
    async fn unread_count(&self, user: UserId) -> NotificationStoreResult<u64>;

    /// Marks a notification read, guarded on the recipient.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::NotFound`] when no notification
    /// with the given identifier belongs to the recipient.
    async fn mark_read(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> NotificationStoreResult<()>;
}

/// Errors returned by notification store implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationStoreError {
    /// No notification with the identifier belongs to the recipient.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
