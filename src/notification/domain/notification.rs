//! Notification aggregate and the lifecycle events that produce it.

use super::{
    NotificationId, ParseNotificationEventError, ParseNotificationKindError,
    ParseRelatedKindError,
};
use crate::identity::UserId;
use crate::task::domain::{ApplicationId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Neutral informational notice.
    Info,
    /// Positive outcome.
    Success,
    /// Outcome the recipient may want to act on.
    Warning,
    /// Failure notice.
    Error,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, ParseNotificationKindError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

/// Lifecycle event that triggered a notification.
///
/// Part of the idempotency key: dispatching the same event twice for the
/// same (recipient, related entity) stores exactly one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A new application arrived on the recipient's task.
    NewApplication,
    /// The recipient's application was accepted.
    ApplicationAccepted,
    /// The recipient's application was rejected.
    ApplicationRejected,
    /// The recipient's assignment was cancelled by the creator.
    AssignmentCancelled,
    /// The task the recipient worked on was marked complete.
    TaskCompleted,
}

impl NotificationEvent {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewApplication => "new_application",
            Self::ApplicationAccepted => "application_accepted",
            Self::ApplicationRejected => "application_rejected",
            Self::AssignmentCancelled => "assignment_cancelled",
            Self::TaskCompleted => "task_completed",
        }
    }

    /// Returns the severity this event is rendered with.
    #[must_use]
    pub const fn kind(self) -> NotificationKind {
        match self {
            Self::NewApplication => NotificationKind::Info,
            Self::ApplicationAccepted | Self::TaskCompleted => NotificationKind::Success,
            Self::ApplicationRejected | Self::AssignmentCancelled => NotificationKind::Warning,
        }
    }

    /// Returns the rendered notification title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NewApplication => "New application",
            Self::ApplicationAccepted => "Application accepted",
            Self::ApplicationRejected => "Application rejected",
            Self::AssignmentCancelled => "Assignment cancelled",
            Self::TaskCompleted => "Task completed",
        }
    }

    /// Renders the notification message for the given task title.
    #[must_use]
    pub fn message(self, task_title: &str) -> String {
        match self {
            Self::NewApplication => {
                format!("You received a new application for \"{task_title}\".")
            }
            Self::ApplicationAccepted => {
                format!("Your application for \"{task_title}\" was accepted.")
            }
            Self::ApplicationRejected => {
                format!("Your application for \"{task_title}\" was rejected.")
            }
            Self::AssignmentCancelled => {
                format!("Your assignment for \"{task_title}\" was cancelled.")
            }
            Self::TaskCompleted => {
                format!("The task \"{task_title}\" was marked complete.")
            }
        }
    }
}

impl TryFrom<&str> for NotificationEvent {
    type Error = ParseNotificationEventError;

    fn try_from(value: &str) -> Result<Self, ParseNotificationEventError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new_application" => Ok(Self::NewApplication),
            "application_accepted" => Ok(Self::ApplicationAccepted),
            "application_rejected" => Ok(Self::ApplicationRejected),
            "assignment_cancelled" => Ok(Self::AssignmentCancelled),
            "task_completed" => Ok(Self::TaskCompleted),
            _ => Err(ParseNotificationEventError(value.to_owned())),
        }
    }
}

/// Kind of entity a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    /// The notification refers to a task.
    Task,
    /// The notification refers to an application.
    Application,
}

impl RelatedKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Application => "application",
        }
    }
}

impl TryFrom<&str> for RelatedKind {
    type Error = ParseRelatedKindError;

    fn try_from(value: &str) -> Result<Self, ParseRelatedKindError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "task" => Ok(Self::Task),
            "application" => Ok(Self::Application),
            _ => Err(ParseRelatedKindError(value.to_owned())),
        }
    }
}

/// Typed reference to the entity a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedEntity {
    kind: RelatedKind,
    id: Uuid,
}

impl RelatedEntity {
    /// References a task.
    #[must_use]
    pub const fn task(id: TaskId) -> Self {
        Self {
            kind: RelatedKind::Task,
            id: id.into_inner(),
        }
    }

    /// References an application.
    #[must_use]
    pub const fn application(id: ApplicationId) -> Self {
        Self {
            kind: RelatedKind::Application,
            id: id.into_inner(),
        }
    }

    /// Reconstructs a reference from persisted parts.
    #[must_use]
    pub const fn from_parts(kind: RelatedKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    /// Returns the referenced entity kind.
    #[must_use]
    pub const fn kind(self) -> RelatedKind {
        self.kind
    }

    /// Returns the referenced entity identifier.
    #[must_use]
    pub const fn id(self) -> Uuid {
        self.id
    }
}

/// Notification aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    user_id: UserId,
    title: String,
    message: String,
    kind: NotificationKind,
    read: bool,
    related: RelatedEntity,
    event: NotificationEvent,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted notification identifier.
    pub id: NotificationId,
    /// Persisted recipient.
    pub user_id: UserId,
    /// Persisted rendered title.
    pub title: String,
    /// Persisted rendered message.
    pub message: String,
    /// Persisted severity.
    pub kind: NotificationKind,
    /// Persisted read flag.
    pub read: bool,
    /// Persisted related-entity reference.
    pub related: RelatedEntity,
    /// Persisted triggering event.
    pub event: NotificationEvent,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Renders a new unread notification for a lifecycle event.
    #[must_use]
    pub fn render(
        recipient: UserId,
        event: NotificationEvent,
        related: RelatedEntity,
        task_title: &str,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id: recipient,
            title: event.title().to_owned(),
            message: event.message(task_title),
            kind: event.kind(),
            read: false,
            related,
            event,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            title: data.title,
            message: data.message,
            kind: data.kind,
            read: data.read,
            related: data.related,
            event: data.event,
            created_at: data.created_at,
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the rendered title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns `true` once the recipient has read the notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read
    }

    /// Returns the related-entity reference.
    #[must_use]
    pub const fn related(&self) -> RelatedEntity {
        self.related
    }

    /// Returns the triggering event.
    #[must_use]
    pub const fn event(&self) -> NotificationEvent {
        self.event
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the notification read. Idempotent; the engine never mutates
    /// a notification after dispatch on any other path.
    pub const fn mark_read(&mut self) {
        self.read = true;
    }
}
