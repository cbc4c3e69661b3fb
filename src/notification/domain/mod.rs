//! Domain model for lifecycle notifications.

mod error;
mod ids;
mod notification;

pub use error::{
    ParseNotificationEventError, ParseNotificationKindError, ParseRelatedKindError,
};
pub use ids::NotificationId;
pub use notification::{
    Notification, NotificationEvent, NotificationKind, PersistedNotificationData, RelatedEntity,
    RelatedKind,
};
