//! Lifecycle orchestrator for the task/application marketplace.
//!
//! [`MarketplaceService`] is the only component spanning the task and
//! application state machines plus the notification dispatcher. Every
//! multi-step operation runs as a sequence of conditional writes in a
//! fixed order: applications first, then the task, then notifications.
//! A task write that loses its race triggers compensating application
//! writes before the operation fails, so no partial acceptance survives.

use crate::identity::UserId;
use crate::notification::{
    domain::{NotificationEvent, RelatedEntity},
    ports::NotificationStore,
    services::{DispatchRequest, NotificationDispatcher},
};
use crate::task::{
    domain::{
        ApplicantContact, Application, ApplicationId, ApplicationStatus, BoardDomainError,
        NewApplicationSpec, NewTaskSpec, Rating, Task, TaskEdit, TaskId, TaskStatus,
        TransitionError, ValidationError,
    },
    ports::{BoardRepository, BoardRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Precondition failures, including lost races. The caller may retry
/// after re-reading state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// The task is not open for the attempted operation.
    #[error("task {0} is not active")]
    TaskNotActive(TaskId),

    /// The task has no current assignment.
    #[error("task {0} is not assigned")]
    TaskNotAssigned(TaskId),

    /// Creators cannot apply to their own tasks.
    #[error("creator cannot apply to own task {0}")]
    SelfApplication(TaskId),

    /// The applicant already has an open application on the task.
    #[error("an open application already exists on task {0}")]
    DuplicateApplication(TaskId),

    /// The application has already been decided.
    #[error("application {0} is no longer pending")]
    ApplicationNotPending(ApplicationId),

    /// Deletion was blocked by pending or accepted applications.
    #[error("task {0} still has open applications")]
    OpenApplicationsRemain(TaskId),

    /// A concurrent operation won the conditional-write race.
    #[error("a concurrent update won the race on task {0}; re-read and retry")]
    LostRace(TaskId),
}

/// Entity lookups that found nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    /// No task with the identifier exists.
    #[error("task not found: {0}")]
    Task(TaskId),

    /// No application with the identifier exists.
    #[error("application not found: {0}")]
    Application(ApplicationId),
}

/// Service-level errors for marketplace lifecycle operations.
///
/// The variants carry the caller-facing taxonomy: validation failures are
/// never retried, conflicts may be retried after re-reading state, and
/// invalid transitions are terminal-state violations.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Malformed input; the caller's fault.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The acting user lacks rights on the target entity.
    #[error("user {user} may not {action}")]
    Authorization {
        /// User who attempted the operation.
        user: UserId,
        /// Operation that was refused.
        action: &'static str,
    },

    /// A precondition or conditional-write guard failed.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The state machine forbids the requested transition.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// The target entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Persistence-layer failure.
    #[error(transparent)]
    Repository(BoardRepositoryError),
}

impl From<BoardDomainError> for MarketplaceError {
    fn from(err: BoardDomainError) -> Self {
        match err {
            BoardDomainError::Validation(validation) => Self::Validation(validation),
            BoardDomainError::Transition(transition) => Self::InvalidTransition(transition),
        }
    }
}

impl From<BoardRepositoryError> for MarketplaceError {
    fn from(err: BoardRepositoryError) -> Self {
        match err {
            BoardRepositoryError::TaskNotFound(task_id) => {
                Self::NotFound(NotFoundError::Task(task_id))
            }
            BoardRepositoryError::ApplicationNotFound(application_id) => {
                Self::NotFound(NotFoundError::Application(application_id))
            }
            BoardRepositoryError::TaskStatusStale { task_id, .. } => {
                Self::Conflict(ConflictError::LostRace(task_id))
            }
            BoardRepositoryError::ApplicationStatusStale { application_id, .. } => {
                Self::Conflict(ConflictError::ApplicationNotPending(application_id))
            }
            BoardRepositoryError::OpenApplicationExists { task_id, .. } => {
                Self::Conflict(ConflictError::DuplicateApplication(task_id))
            }
            BoardRepositoryError::OpenApplicationsRemain(task_id) => {
                Self::Conflict(ConflictError::OpenApplicationsRemain(task_id))
            }
            other => Self::Repository(other),
        }
    }
}

/// Result type for marketplace service operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Request payload for applying to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    task_id: TaskId,
    applicant_id: UserId,
    applicant_name: String,
    email: String,
    phone: Option<String>,
    proposal: String,
}

impl ApplyRequest {
    /// Creates an application request with required fields.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        applicant_id: UserId,
        applicant_name: impl Into<String>,
        email: impl Into<String>,
        proposal: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            applicant_id,
            applicant_name: applicant_name.into(),
            email: email.into(),
            phone: None,
            proposal: proposal.into(),
        }
    }

    /// Shares a phone number with the task creator.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Everything the accept operation changed, for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    /// The task, now assigned.
    pub task: Task,
    /// The accepted application.
    pub accepted: Application,
    /// Applications that were pending and are now rejected.
    pub rejected: Vec<Application>,
}

/// Outcome of marking a task complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// The task, now completed.
    pub task: Task,
    /// Validated rating for the assignee, for the caller to forward to
    /// its rating store.
    pub rating: Option<Rating>,
}

/// Marketplace lifecycle orchestration service.
#[derive(Clone)]
pub struct MarketplaceService<R, N, C>
where
    R: BoardRepository,
    N: NotificationStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: NotificationDispatcher<N, C>,
    clock: Arc<C>,
}

impl<R, N, C> MarketplaceService<R, N, C>
where
    R: BoardRepository,
    N: NotificationStore,
    C: Clock + Send + Sync,
{
    /// Creates a new marketplace service.
    #[must_use]
    pub fn new(repository: Arc<R>, notifications: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifier: NotificationDispatcher::new(notifications, clock.clone()),
            clock,
        }
    }

    /// Posts a new task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Validation`] when a field is malformed
    /// and repository errors when persistence rejects the insert.
    pub async fn create_task(&self, spec: NewTaskSpec) -> MarketplaceResult<Task> {
        let task = Task::post(spec, &*self.clock)?;
        self.repository.insert_task(&task).await?;
        Ok(task)
    }

    /// Edits an active task's fields.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task, [`MarketplaceError::InvalidTransition`] when the
    /// task is assigned or terminal, and [`MarketplaceError::Validation`]
    /// when an edited value is malformed.
    pub async fn edit_task(
        &self,
        task_id: TaskId,
        acting_user: UserId,
        edit: TaskEdit,
    ) -> MarketplaceResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        ensure_creator(&task, acting_user, "edit this task")?;
        task.apply_edit(edit, &*self.clock)?;
        self.repository
            .update_task(&task, TaskStatus::Active)
            .await?;
        Ok(task)
    }

    /// Deletes a task with no open applications.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task and [`MarketplaceError::Conflict`] while pending
    /// or accepted applications reference it.
    pub async fn delete_task(&self, task_id: TaskId, acting_user: UserId) -> MarketplaceResult<()> {
        let task = self.find_task_or_error(task_id).await?;
        ensure_creator(&task, acting_user, "delete this task")?;
        self.repository.delete_task(task_id).await?;
        Ok(())
    }

    /// Applies to an active task.
    ///
    /// Dispatches a `new_application` notification to the task creator.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Conflict`] when the task is not active,
    /// the applicant created the task, or the applicant already has an
    /// open application on it; [`MarketplaceError::Validation`] when the
    /// proposal or contact details are malformed.
    pub async fn apply(&self, request: ApplyRequest) -> MarketplaceResult<Application> {
        let task = self.find_task_or_error(request.task_id).await?;
        if task.status() != TaskStatus::Active {
            return Err(ConflictError::TaskNotActive(task.id()).into());
        }
        if request.applicant_id == task.creator_id() {
            return Err(ConflictError::SelfApplication(task.id()).into());
        }

        let contact = ApplicantContact::new(request.email, request.phone)?;
        let application = Application::submit(
            NewApplicationSpec {
                task_id: request.task_id,
                applicant_id: request.applicant_id,
                applicant_name: request.applicant_name,
                contact,
                proposal: request.proposal,
            },
            &*self.clock,
        )?;
        self.repository.insert_application(&application).await?;

        self.notifier
            .dispatch(DispatchRequest::new(
                task.creator_id(),
                NotificationEvent::NewApplication,
                RelatedEntity::application(application.id()),
                task.title(),
            ))
            .await;
        Ok(application)
    }

    /// Accepts a pending application, rejecting every other pending
    /// application on the task and assigning the task to the applicant.
    ///
    /// The steps run as conditional writes in application-then-task
    /// order. When the task assignment loses its race the application
    /// writes are compensated and the whole operation fails with a
    /// conflict; no partial acceptance is retained.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task, [`MarketplaceError::InvalidTransition`] when the
    /// task is terminal, and [`MarketplaceError::Conflict`] when the
    /// application is not pending, the task is assigned, or a concurrent
    /// operation wins a race.
    pub async fn accept(
        &self,
        application_id: ApplicationId,
        acting_user: UserId,
    ) -> MarketplaceResult<AcceptOutcome> {
        let mut application = self.find_application_or_error(application_id).await?;
        let mut task = self.find_task_or_error(application.task_id()).await?;
        ensure_creator(&task, acting_user, "accept applications for this task")?;
        if task.status().is_terminal() {
            return Err(TransitionError::InvalidTaskTransition {
                task_id: task.id(),
                from: task.status(),
                to: TaskStatus::Assigned,
            }
            .into());
        }
        if task.status() != TaskStatus::Active {
            return Err(ConflictError::TaskNotActive(task.id()).into());
        }
        if application.status() != ApplicationStatus::Pending {
            return Err(ConflictError::ApplicationNotPending(application_id).into());
        }

        application.accept(&*self.clock)?;
        self.repository
            .update_application(&application, ApplicationStatus::Pending)
            .await?;

        let now = self.clock.utc();
        let rejected = self
            .repository
            .reject_pending(task.id(), Some(application.id()), now)
            .await?;

        task.assign(application.applicant_id(), &*self.clock)?;
        if let Err(err) = self
            .repository
            .update_task(&task, TaskStatus::Active)
            .await
        {
            self.compensate_accept(&application, &rejected).await;
            return Err(err.into());
        }

        self.notifier
            .dispatch(DispatchRequest::new(
                application.applicant_id(),
                NotificationEvent::ApplicationAccepted,
                RelatedEntity::application(application.id()),
                task.title(),
            ))
            .await;
        for loser in &rejected {
            self.notifier
                .dispatch(DispatchRequest::new(
                    loser.applicant_id(),
                    NotificationEvent::ApplicationRejected,
                    RelatedEntity::application(loser.id()),
                    task.title(),
                ))
                .await;
        }

        Ok(AcceptOutcome {
            task,
            accepted: application,
            rejected,
        })
    }

    /// Rejects a pending application.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task and [`MarketplaceError::Conflict`] when the
    /// application is no longer pending.
    pub async fn reject(
        &self,
        application_id: ApplicationId,
        acting_user: UserId,
    ) -> MarketplaceResult<Application> {
        let mut application = self.find_application_or_error(application_id).await?;
        let task = self.find_task_or_error(application.task_id()).await?;
        ensure_creator(&task, acting_user, "reject applications for this task")?;
        if application.status() != ApplicationStatus::Pending {
            return Err(ConflictError::ApplicationNotPending(application_id).into());
        }

        application.reject(&*self.clock)?;
        self.repository
            .update_application(&application, ApplicationStatus::Pending)
            .await?;

        self.notifier
            .dispatch(DispatchRequest::new(
                application.applicant_id(),
                NotificationEvent::ApplicationRejected,
                RelatedEntity::application(application.id()),
                task.title(),
            ))
            .await;
        Ok(application)
    }

    /// Withdraws the acting user's own pending application.
    ///
    /// Never touches task status. Retracting an accepted application is
    /// an invalid transition; assignment cancellation is the creator-side
    /// path for undoing an acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// submitted the application and
    /// [`MarketplaceError::InvalidTransition`] when it is not pending.
    pub async fn retract(
        &self,
        application_id: ApplicationId,
        acting_user: UserId,
    ) -> MarketplaceResult<Application> {
        let mut application = self.find_application_or_error(application_id).await?;
        if application.applicant_id() != acting_user {
            return Err(MarketplaceError::Authorization {
                user: acting_user,
                action: "retract this application",
            });
        }

        application.retract(&*self.clock)?;
        self.repository
            .update_application(&application, ApplicationStatus::Pending)
            .await?;
        Ok(application)
    }

    /// Cancels the current assignment, returning the task to active and
    /// voiding the accepted application.
    ///
    /// Dispatches an `assignment_cancelled` notification to the former
    /// assignee.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task, [`MarketplaceError::InvalidTransition`] when the
    /// task is terminal, and [`MarketplaceError::Conflict`] when it is
    /// not assigned.
    pub async fn cancel_assignment(
        &self,
        task_id: TaskId,
        acting_user: UserId,
    ) -> MarketplaceResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        ensure_creator(&task, acting_user, "cancel this assignment")?;
        match task.status() {
            TaskStatus::Assigned => {}
            TaskStatus::Active => {
                return Err(ConflictError::TaskNotAssigned(task_id).into());
            }
            status => {
                return Err(TransitionError::InvalidTaskTransition {
                    task_id,
                    from: status,
                    to: TaskStatus::Active,
                }
                .into());
            }
        }
        let former_assignee = task.assigned_to();

        let accepted = self.repository.find_accepted_application(task_id).await?;
        if let Some(mut application) = accepted.clone() {
            application.void_acceptance(&*self.clock)?;
            self.repository
                .update_application(&application, ApplicationStatus::Accepted)
                .await?;
        }

        task.unassign(&*self.clock)?;
        if let Err(err) = self
            .repository
            .update_task(&task, TaskStatus::Assigned)
            .await
        {
            if let Some(application) = accepted {
                self.revert_quietly(
                    application.id(),
                    ApplicationStatus::Cancelled,
                    ApplicationStatus::Accepted,
                )
                .await;
            }
            return Err(err.into());
        }

        if let Some(assignee) = former_assignee {
            self.notifier
                .dispatch(DispatchRequest::new(
                    assignee,
                    NotificationEvent::AssignmentCancelled,
                    RelatedEntity::task(task_id),
                    task.title(),
                ))
                .await;
        }
        Ok(task)
    }

    /// Marks an assigned task completed. Terminal.
    ///
    /// The optional rating is validated and returned for the caller to
    /// forward to its rating store; it is never persisted here.
    /// Dispatches a `task_completed` notification to the assignee.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task, [`MarketplaceError::InvalidTransition`] when the
    /// task is terminal, [`MarketplaceError::Conflict`] when it is not
    /// assigned, and [`MarketplaceError::Validation`] when the rating is
    /// out of range.
    pub async fn mark_complete(
        &self,
        task_id: TaskId,
        acting_user: UserId,
        rating: Option<u8>,
    ) -> MarketplaceResult<CompletionOutcome> {
        let mut task = self.find_task_or_error(task_id).await?;
        ensure_creator(&task, acting_user, "complete this task")?;
        let validated_rating = rating.map(Rating::new).transpose()?;
        if task.status() == TaskStatus::Active {
            return Err(ConflictError::TaskNotAssigned(task_id).into());
        }
        let assignee = task.assigned_to();

        task.complete(&*self.clock)?;
        self.repository
            .update_task(&task, TaskStatus::Assigned)
            .await?;

        if let Some(assignee) = assignee {
            self.notifier
                .dispatch(DispatchRequest::new(
                    assignee,
                    NotificationEvent::TaskCompleted,
                    RelatedEntity::task(task_id),
                    task.title(),
                ))
                .await;
        }
        Ok(CompletionOutcome {
            task,
            rating: validated_rating,
        })
    }

    /// Cancels a task outright. Terminal.
    ///
    /// An assigned task's accepted application is voided and every still-
    /// pending application is rejected before the task write, then the
    /// former assignee and rejected applicants are notified.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task and [`MarketplaceError::InvalidTransition`] when
    /// it is already terminal.
    pub async fn cancel_task(
        &self,
        task_id: TaskId,
        acting_user: UserId,
    ) -> MarketplaceResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        ensure_creator(&task, acting_user, "cancel this task")?;
        let previous_status = task.status();
        let former_assignee = task.assigned_to();

        let accepted = self.repository.find_accepted_application(task_id).await?;
        if let Some(mut application) = accepted.clone() {
            application.void_acceptance(&*self.clock)?;
            self.repository
                .update_application(&application, ApplicationStatus::Accepted)
                .await?;
        }

        let now = self.clock.utc();
        let rejected = self.repository.reject_pending(task_id, None, now).await?;

        task.cancel(&*self.clock)?;
        if let Err(err) = self.repository.update_task(&task, previous_status).await {
            if let Some(application) = accepted {
                self.revert_quietly(
                    application.id(),
                    ApplicationStatus::Cancelled,
                    ApplicationStatus::Accepted,
                )
                .await;
            }
            for application in &rejected {
                self.revert_quietly(
                    application.id(),
                    ApplicationStatus::Rejected,
                    ApplicationStatus::Pending,
                )
                .await;
            }
            return Err(err.into());
        }

        if let Some(assignee) = former_assignee {
            self.notifier
                .dispatch(DispatchRequest::new(
                    assignee,
                    NotificationEvent::AssignmentCancelled,
                    RelatedEntity::task(task_id),
                    task.title(),
                ))
                .await;
        }
        for application in &rejected {
            self.notifier
                .dispatch(DispatchRequest::new(
                    application.applicant_id(),
                    NotificationEvent::ApplicationRejected,
                    RelatedEntity::application(application.id()),
                    task.title(),
                ))
                .await;
        }
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when no task exists.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the lookup.
    pub async fn find_task(&self, task_id: TaskId) -> MarketplaceResult<Option<Task>> {
        Ok(self.repository.find_task(task_id).await?)
    }

    /// Lists tasks open for applications right now.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the lookup.
    pub async fn list_open_tasks(&self) -> MarketplaceResult<Vec<Task>> {
        let now = self.clock.utc();
        Ok(self.repository.list_open_tasks(now).await?)
    }

    /// Lists all tasks posted by a creator.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the lookup.
    pub async fn tasks_by_creator(&self, creator: UserId) -> MarketplaceResult<Vec<Task>> {
        Ok(self.repository.list_tasks_by_creator(creator).await?)
    }

    /// Lists a task's applications for its creator.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::Authorization`] unless the acting user
    /// created the task.
    pub async fn applications_for_task(
        &self,
        task_id: TaskId,
        acting_user: UserId,
    ) -> MarketplaceResult<Vec<Application>> {
        let task = self.find_task_or_error(task_id).await?;
        ensure_creator(&task, acting_user, "list applications for this task")?;
        Ok(self.repository.list_applications_for_task(task_id).await?)
    }

    /// Lists the acting user's own applications.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the lookup.
    pub async fn applications_by_applicant(
        &self,
        applicant: UserId,
    ) -> MarketplaceResult<Vec<Application>> {
        Ok(self
            .repository
            .list_applications_by_applicant(applicant)
            .await?)
    }

    /// Read access to the notification dispatcher, for inbox operations.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationDispatcher<N, C> {
        &self.notifier
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> MarketplaceResult<Task> {
        self.repository
            .find_task(task_id)
            .await?
            .ok_or(MarketplaceError::NotFound(NotFoundError::Task(task_id)))
    }

    async fn find_application_or_error(
        &self,
        application_id: ApplicationId,
    ) -> MarketplaceResult<Application> {
        self.repository
            .find_application(application_id)
            .await?
            .ok_or(MarketplaceError::NotFound(NotFoundError::Application(
                application_id,
            )))
    }

    /// Rolls back the application writes of a lost accept race.
    async fn compensate_accept(&self, accepted: &Application, rejected: &[Application]) {
        self.revert_quietly(
            accepted.id(),
            ApplicationStatus::Accepted,
            ApplicationStatus::Pending,
        )
        .await;
        for application in rejected {
            self.revert_quietly(
                application.id(),
                ApplicationStatus::Rejected,
                ApplicationStatus::Pending,
            )
            .await;
        }
    }

    /// Compensating revert that logs instead of failing; the store's
    /// guards keep an unrecovered row from ever producing an invalid
    /// assignment.
    async fn revert_quietly(
        &self,
        application_id: ApplicationId,
        expected: ApplicationStatus,
        to: ApplicationStatus,
    ) {
        let now = self.clock.utc();
        if let Err(err) = self
            .repository
            .revert_application(application_id, expected, to, now)
            .await
        {
            warn!(
                error = %err,
                application = %application_id,
                "compensating revert failed"
            );
        }
    }
}

/// Rejects operations on a task by anyone but its creator.
fn ensure_creator(
    task: &Task,
    acting_user: UserId,
    action: &'static str,
) -> Result<(), MarketplaceError> {
    if task.creator_id() != acting_user {
        return Err(MarketplaceError::Authorization {
            user: acting_user,
            action,
        });
    }
    Ok(())
}
