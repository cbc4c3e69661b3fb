//! `PostgreSQL` store implementation for notification persistence.

use super::{
    models::{NewNotificationRow, NotificationRow},
    schema::notifications,
};
use crate::identity::UserId;
use crate::notification::{
    domain::{
        Notification, NotificationEvent, NotificationId, NotificationKind,
        PersistedNotificationData, RelatedEntity, RelatedKind,
    },
    ports::{NotificationStore, NotificationStoreError, NotificationStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by notification adapters.
pub type NotificationPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed notification store.
#[derive(Debug, Clone)]
pub struct PostgresNotificationStore {
    pool: NotificationPgPool,
}

impl PostgresNotificationStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: NotificationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotificationStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationStoreError::persistence)?
    }
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    async fn insert_if_absent(
        &self,
        notification: &Notification,
    ) -> NotificationStoreResult<bool> {
        let row = to_new_row(notification);
        self.run_blocking(move |connection| {
            // ON CONFLICT DO NOTHING against the dispatch uniqueness index
            // makes insert-or-ignore a single atomic statement.
            let affected = diesel::insert_into(notifications::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(NotificationStoreError::persistence)?;
            Ok(affected > 0)
        })
        .await
    }

    async fn list_for_user(&self, user: UserId) -> NotificationStoreResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::user_id.eq(user.into_inner()))
                .order(notifications::created_at.desc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationStoreError::persistence)?;
            rows.into_iter().map(row_to_notification).collect()
        })
        .await
    }

    async fn unread_count(&self, user: UserId) -> NotificationStoreResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = notifications::table
                .filter(notifications::user_id.eq(user.into_inner()))
                .filter(notifications::read.eq(false))
                .count()
                .get_result(connection)
                .map_err(NotificationStoreError::persistence)?;
            u64::try_from(count).map_err(NotificationStoreError::persistence)
        })
        .await
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> NotificationStoreResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                notifications::table
                    .filter(notifications::id.eq(id.into_inner()))
                    .filter(notifications::user_id.eq(recipient.into_inner())),
            )
            .set(notifications::read.eq(true))
            .execute(connection)
            .map_err(NotificationStoreError::persistence)?;

            if affected == 0 {
                return Err(NotificationStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn to_new_row(notification: &Notification) -> NewNotificationRow {
    NewNotificationRow {
        id: notification.id().into_inner(),
        user_id: notification.user_id().into_inner(),
        title: notification.title().to_owned(),
        message: notification.message().to_owned(),
        kind: notification.kind().as_str().to_owned(),
        read: notification.is_read(),
        related_id: notification.related().id(),
        related_type: notification.related().kind().as_str().to_owned(),
        event: notification.event().as_str().to_owned(),
        created_at: notification.created_at(),
    }
}

fn row_to_notification(row: NotificationRow) -> NotificationStoreResult<Notification> {
    let kind = NotificationKind::try_from(row.kind.as_str())
        .map_err(NotificationStoreError::persistence)?;
    let related_kind = RelatedKind::try_from(row.related_type.as_str())
        .map_err(NotificationStoreError::persistence)?;
    let event = NotificationEvent::try_from(row.event.as_str())
        .map_err(NotificationStoreError::persistence)?;

    Ok(Notification::from_persisted(PersistedNotificationData {
        id: NotificationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        message: row.message,
        kind,
        read: row.read,
        related: RelatedEntity::from_parts(related_kind, row.related_id),
        event,
        created_at: row.created_at,
    }))
}
