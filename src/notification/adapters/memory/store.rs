//! In-memory notification store for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::UserId;
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationStore, NotificationStoreError, NotificationStoreResult},
};

/// Thread-safe in-memory notification store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationStore {
    state: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl InMemoryNotificationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert_if_absent(
        &self,
        notification: &Notification,
    ) -> NotificationStoreResult<bool> {
        let mut state = self.state.write().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let duplicate = state.values().any(|stored| {
            stored.user_id() == notification.user_id()
                && stored.related() == notification.related()
                && stored.event() == notification.event()
        });
        if duplicate {
            return Ok(false);
        }
        state.insert(notification.id(), notification.clone());
        Ok(true)
    }

    async fn list_for_user(&self, user: UserId) -> NotificationStoreResult<Vec<Notification>> {
        let state = self.state.read().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut notifications: Vec<Notification> = state
            .values()
            .filter(|notification| notification.user_id() == user)
            .cloned()
            .collect();
        notifications.sort_by_key(|notification| std::cmp::Reverse(notification.created_at()));
        Ok(notifications)
    }

    async fn unread_count(&self, user: UserId) -> NotificationStoreResult<u64> {
        let state = self.state.read().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let count = state
            .values()
            .filter(|notification| notification.user_id() == user && !notification.is_read())
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> NotificationStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let notification = state
            .get_mut(&id)
            .filter(|stored| stored.user_id() == recipient)
            .ok_or(NotificationStoreError::NotFound(id))?;
        notification.mark_read();
        Ok(())
    }
}
