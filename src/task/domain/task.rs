//! Task aggregate root and the task lifecycle state machine.

use super::{
    ParseTaskKindError, ParseTaskStatusError, Reward, TaskId, TransitionError, ValidationError,
};
use crate::identity::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is open for applications.
    Active,
    /// Exactly one application has been accepted.
    Assigned,
    /// Task has been completed by the assignee.
    Completed,
    /// Task has been cancelled by the creator.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` when the state machine permits `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Active, Self::Assigned)
                | (Self::Assigned, Self::Active)
                | (Self::Active | Self::Assigned, Self::Completed | Self::Cancelled)
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Kind of posted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Ordinary single-worker task.
    Normal,
    /// Joint task advertised for shared participation.
    Joint,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Joint => "joint",
        }
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = ParseTaskKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "normal" => Ok(Self::Normal),
            "joint" => Ok(Self::Joint),
            _ => Err(ParseTaskKindError(value.to_owned())),
        }
    }
}

/// Input for posting a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskSpec {
    /// Short task title.
    pub title: String,
    /// Full task description.
    pub description: String,
    /// Where the work takes place.
    pub location: String,
    /// Offered reward in whole currency units.
    pub reward: i64,
    /// Latest useful completion time; advisory visibility filter only.
    pub deadline: DateTime<Utc>,
    /// Kind of task.
    pub kind: TaskKind,
    /// Posting user.
    pub creator_id: UserId,
    /// Denormalized display name of the posting user.
    pub creator_name: String,
}

/// Pending field changes for an active task.
///
/// Absent fields keep their current values. Text fields are trimmed and
/// rejected when empty at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    reward: Option<Reward>,
    deadline: Option<DateTime<Utc>>,
}

impl TaskEdit {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.reward.is_none()
            && self.deadline.is_none()
    }

    /// Sets a replacement title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] when the title is empty
    /// after trimming.
    pub fn with_title(mut self, title: impl Into<String>) -> Result<Self, ValidationError> {
        self.title = Some(non_empty(title, ValidationError::EmptyTitle)?);
        Ok(self)
    }

    /// Sets a replacement description.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDescription`] when the description
    /// is empty after trimming.
    pub fn with_description(
        mut self,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.description = Some(non_empty(description, ValidationError::EmptyDescription)?);
        Ok(self)
    }

    /// Sets a replacement location.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLocation`] when the location is
    /// empty after trimming.
    pub fn with_location(mut self, location: impl Into<String>) -> Result<Self, ValidationError> {
        self.location = Some(non_empty(location, ValidationError::EmptyLocation)?);
        Ok(self)
    }

    /// Sets a replacement reward.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPositiveReward`] when the amount is
    /// not strictly positive.
    pub fn with_reward(mut self, amount: i64) -> Result<Self, ValidationError> {
        self.reward = Some(Reward::new(amount)?);
        Ok(self)
    }

    /// Sets a replacement deadline. Validated against the clock when the
    /// edit is applied.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    location: String,
    reward: Reward,
    deadline: DateTime<Utc>,
    kind: TaskKind,
    status: TaskStatus,
    creator_id: UserId,
    creator_name: String,
    assigned_to: Option<UserId>,
    assigned_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted location.
    pub location: String,
    /// Persisted reward.
    pub reward: Reward,
    /// Persisted deadline.
    pub deadline: DateTime<Utc>,
    /// Persisted kind.
    pub kind: TaskKind,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creator identifier.
    pub creator_id: UserId,
    /// Persisted creator display name.
    pub creator_name: String,
    /// Persisted assignee, if any.
    pub assigned_to: Option<UserId>,
    /// Persisted assignment timestamp, if any.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Posts a new task in [`TaskStatus::Active`] status.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a text field is empty after
    /// trimming, the reward is not positive, or the deadline is not in the
    /// future.
    pub fn post(spec: NewTaskSpec, clock: &impl Clock) -> Result<Self, ValidationError> {
        let timestamp = clock.utc();
        let title = non_empty(spec.title, ValidationError::EmptyTitle)?;
        let description = non_empty(spec.description, ValidationError::EmptyDescription)?;
        let location = non_empty(spec.location, ValidationError::EmptyLocation)?;
        let creator_name = non_empty(spec.creator_name, ValidationError::EmptyCreatorName)?;
        let reward = Reward::new(spec.reward)?;
        if spec.deadline <= timestamp {
            return Err(ValidationError::DeadlineNotInFuture);
        }

        Ok(Self {
            id: TaskId::new(),
            title,
            description,
            location,
            reward,
            deadline: spec.deadline,
            kind: spec.kind,
            status: TaskStatus::Active,
            creator_id: spec.creator_id,
            creator_name,
            assigned_to: None,
            assigned_at: None,
            completed_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            location: data.location,
            reward: data.reward,
            deadline: data.deadline,
            kind: data.kind,
            status: data.status,
            creator_id: data.creator_id,
            creator_name: data.creator_name,
            assigned_to: data.assigned_to,
            assigned_at: data.assigned_at,
            completed_at: data.completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the offered reward.
    #[must_use]
    pub const fn reward(&self) -> Reward {
        self.reward
    }

    /// Returns the advisory deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creator identifier.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the creator display name.
    #[must_use]
    pub fn creator_name(&self) -> &str {
        &self.creator_name
    }

    /// Returns the current assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the assignment timestamp, if any.
    #[must_use]
    pub const fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.assigned_at
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Assigns the task to an accepted applicant.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTaskTransition`] unless the task
    /// is currently [`TaskStatus::Active`].
    pub fn assign(&mut self, assignee: UserId, clock: &impl Clock) -> Result<(), TransitionError> {
        self.guard_transition(TaskStatus::Assigned)?;
        self.status = TaskStatus::Assigned;
        self.assigned_to = Some(assignee);
        self.assigned_at = Some(clock.utc());
        self.touch(clock);
        Ok(())
    }

    /// Cancels the current assignment, returning the task to the open
    /// applicant pool.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTaskTransition`] unless the task
    /// is currently [`TaskStatus::Assigned`].
    pub fn unassign(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        self.guard_transition(TaskStatus::Active)?;
        self.status = TaskStatus::Active;
        self.assigned_to = None;
        self.assigned_at = None;
        self.touch(clock);
        Ok(())
    }

    /// Marks the task completed. Terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTaskTransition`] when the task is
    /// already terminal.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        self.guard_transition(TaskStatus::Completed)?;
        self.status = TaskStatus::Completed;
        self.completed_at = Some(clock.utc());
        self.touch(clock);
        Ok(())
    }

    /// Cancels the task. Terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTaskTransition`] when the task is
    /// already terminal.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        self.guard_transition(TaskStatus::Cancelled)?;
        self.status = TaskStatus::Cancelled;
        self.touch(clock);
        Ok(())
    }

    /// Applies field edits to an active task.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::TaskNotEditable`] unless the task is
    /// [`TaskStatus::Active`], or [`ValidationError::DeadlineNotInFuture`]
    /// when the edited deadline has already passed.
    pub fn apply_edit(
        &mut self,
        edit: TaskEdit,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        if self.status != TaskStatus::Active {
            return Err(TransitionError::TaskNotEditable {
                task_id: self.id,
                status: self.status,
            }
            .into());
        }
        if let Some(deadline) = edit.deadline
            && deadline <= clock.utc()
        {
            return Err(ValidationError::DeadlineNotInFuture.into());
        }

        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(location) = edit.location {
            self.location = location;
        }
        if let Some(reward) = edit.reward {
            self.reward = reward;
        }
        if let Some(deadline) = edit.deadline {
            self.deadline = deadline;
        }
        self.touch(clock);
        Ok(())
    }

    /// Returns `true` when the task is visible in the open listing at the
    /// given instant: active with an unexpired deadline.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Active && self.deadline > now
    }

    fn guard_transition(&self, to: TaskStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError::InvalidTaskTransition {
                task_id: self.id,
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Umbrella for aggregate operations that both validate input and guard
/// lifecycle state.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The state machine rejected the operation.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Trims a text field, rejecting empty values with the given error.
pub(crate) fn non_empty(
    value: impl Into<String>,
    empty_error: ValidationError,
) -> Result<String, ValidationError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty_error);
    }
    Ok(trimmed.to_owned())
}
