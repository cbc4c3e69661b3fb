//! Notification dispatch and inbox access.

use crate::identity::UserId;
use crate::notification::{
    domain::{Notification, NotificationEvent, NotificationId, RelatedEntity},
    ports::{NotificationStore, NotificationStoreResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request payload for dispatching one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Recipient of the notification.
    pub recipient: UserId,
    /// Lifecycle event being announced.
    pub event: NotificationEvent,
    /// Entity the notification refers to.
    pub related: RelatedEntity,
    /// Title of the task the event happened on, for message rendering.
    pub task_title: String,
}

impl DispatchRequest {
    /// Creates a dispatch request.
    #[must_use]
    pub fn new(
        recipient: UserId,
        event: NotificationEvent,
        related: RelatedEntity,
        task_title: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            event,
            related,
            task_title: task_title.into(),
        }
    }
}

/// Idempotent, best-effort notification dispatcher.
///
/// Dispatch never propagates store failures: notification delivery must
/// not block the lifecycle transition that triggered it, so failures are
/// logged and swallowed. Idempotency comes from the store's conditional
/// insert on (recipient, related entity, event).
#[derive(Clone)]
pub struct NotificationDispatcher<S, C>
where
    S: NotificationStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> NotificationDispatcher<S, C>
where
    S: NotificationStore,
    C: Clock + Send + Sync,
{
    /// Creates a new dispatcher.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Renders and stores a notification for a lifecycle event.
    ///
    /// No-ops when an equal dispatch already happened. Infallible by
    /// contract: a failing store is logged and swallowed.
    pub async fn dispatch(&self, request: DispatchRequest) {
        let DispatchRequest {
            recipient,
            event,
            related,
            task_title,
        } = request;
        let notification =
            Notification::render(recipient, event, related, &task_title, &*self.clock);
        match self.store.insert_if_absent(&notification).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    event = event.as_str(),
                    recipient = %recipient,
                    "duplicate notification dispatch suppressed"
                );
            }
            Err(err) => {
                warn!(
                    error = %err,
                    event = event.as_str(),
                    recipient = %recipient,
                    "notification dispatch failed; lifecycle transition unaffected"
                );
            }
        }
    }

    /// Lists the recipient's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns store errors from the lookup.
    pub async fn list_for_user(&self, user: UserId) -> NotificationStoreResult<Vec<Notification>> {
        self.store.list_for_user(user).await
    }

    /// Counts the recipient's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns store errors from the lookup.
    pub async fn unread_count(&self, user: UserId) -> NotificationStoreResult<u64> {
        self.store.unread_count(user).await
    }

    /// Marks one of the acting user's notifications read.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when the notification does not exist or
    /// belongs to another user.
    ///
    /// [`NotFound`]: crate::notification::ports::NotificationStoreError::NotFound
    pub async fn mark_read(
        &self,
        id: NotificationId,
        acting_user: UserId,
    ) -> NotificationStoreResult<()> {
        self.store.mark_read(id, acting_user).await
    }
}
