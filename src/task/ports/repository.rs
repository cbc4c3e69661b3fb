//! Repository port for task and application persistence.
//!
//! The port exposes conditional writes: every status mutation names the
//! status it expects to replace, and implementations persist the change
//! only when the stored row still matches. A failed guard surfaces as a
//! stale-status error so callers can treat the lost race as a conflict
//! instead of silently overwriting a concurrent transition.

use crate::identity::UserId;
use crate::task::domain::{
    Application, ApplicationId, ApplicationStatus, Task, TaskId, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Persistence contract for the task/application context.
///
/// One repository spans both tables so the cross-entity guards (delete
/// only unreferenced tasks, one open application per pair) live behind a
/// single consistency boundary.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a newly posted task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn insert_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>>;

    /// Lists tasks open for applications at the given instant: active
    /// status with an unexpired deadline. The deadline is an advisory
    /// visibility filter; nothing auto-transitions expired tasks.
    async fn list_open_tasks(&self, now: DateTime<Utc>) -> BoardRepositoryResult<Vec<Task>>;

    /// Lists all tasks posted by the given creator, newest first.
    async fn list_tasks_by_creator(&self, creator: UserId) -> BoardRepositoryResult<Vec<Task>>;

    /// Persists a task whose status moved from `expected`, or whose fields
    /// were edited while remaining in `expected`.
    ///
    /// The write applies only while the stored status is still `expected`
    /// (zero rows affected means the caller lost a race).
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] when the task does
    /// not exist and [`BoardRepositoryError::TaskStatusStale`] when the
    /// stored status no longer matches `expected`.
    async fn update_task(&self, task: &Task, expected: TaskStatus) -> BoardRepositoryResult<()>;

    /// Deletes a task, guarded by the absence of open applications.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] when the task does
    /// not exist and [`BoardRepositoryError::OpenApplicationsRemain`] when
    /// a pending or accepted application still references it.
    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()>;

    /// Stores a newly submitted application, guarded by the one-open-
    /// application rule for its (task, applicant) pair.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateApplication`] when the
    /// application ID already exists and
    /// [`BoardRepositoryError::OpenApplicationExists`] when the pair
    /// already has a pending or accepted application.
    async fn insert_application(&self, application: &Application) -> BoardRepositoryResult<()>;

    /// Finds an application by identifier.
    ///
    /// Returns `None` when the application does not exist.
    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> BoardRepositoryResult<Option<Application>>;

    /// Lists all applications on the given task, oldest first.
    async fn list_applications_for_task(
        &self,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Vec<Application>>;

    /// Lists all applications submitted by the given user, newest first.
    async fn list_applications_by_applicant(
        &self,
        applicant: UserId,
    ) -> BoardRepositoryResult<Vec<Application>>;

    /// Finds the accepted application on the given task, if any.
    async fn find_accepted_application(
        &self,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Option<Application>>;

    /// Persists an application whose status moved from `expected`.
    ///
    /// Conditional write with the same guard semantics as
    /// [`BoardRepository::update_task`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ApplicationNotFound`] when the
    /// application does not exist and
    /// [`BoardRepositoryError::ApplicationStatusStale`] when the stored
    /// status no longer matches `expected`.
    async fn update_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> BoardRepositoryResult<()>;

    /// Rejects every pending application on the task (minus `except`,
    /// when given), each behind its own pending guard, and returns the
    /// applications that were actually rejected.
    ///
    /// Applications that raced out of pending before the write are left
    /// untouched and omitted from the result.
    async fn reject_pending(
        &self,
        task_id: TaskId,
        except: Option<ApplicationId>,
        now: DateTime<Utc>,
    ) -> BoardRepositoryResult<Vec<Application>>;

    /// Compensating write: reverts an application to a prior status,
    /// guarded on its current `expected` status.
    ///
    /// The orchestrator uses this to roll back application-side writes
    /// after the task write loses its race. It bypasses the domain state
    /// machine on purpose; it is a storage rollback, not a transition.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::ApplicationNotFound`] or
    /// [`BoardRepositoryError::ApplicationStatusStale`] with the guard
    /// semantics of [`BoardRepository::update_application`].
    async fn revert_application(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        to: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> BoardRepositoryResult<()>;
}

/// Errors returned by board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// An application with the same identifier already exists.
    #[error("duplicate application identifier: {0}")]
    DuplicateApplication(ApplicationId),

    /// The (task, applicant) pair already has an open application.
    #[error("user {applicant_id} already has an open application on task {task_id}")]
    OpenApplicationExists {
        /// Task being applied to.
        task_id: TaskId,
        /// Applicant with the existing open application.
        applicant_id: UserId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The application was not found.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// A conditional task write found a status other than it expected.
    #[error("task {task_id} no longer {expected:?}; write abandoned")]
    TaskStatusStale {
        /// Task whose guard failed.
        task_id: TaskId,
        /// Status the write required.
        expected: TaskStatus,
    },

    /// A conditional application write found a status other than it
    /// expected.
    #[error("application {application_id} no longer {expected:?}; write abandoned")]
    ApplicationStatusStale {
        /// Application whose guard failed.
        application_id: ApplicationId,
        /// Status the write required.
        expected: ApplicationStatus,
    },

    /// Deletion was blocked by pending or accepted applications.
    #[error("task {0} still has open applications")]
    OpenApplicationsRemain(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
