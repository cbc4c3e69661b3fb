//! `PostgreSQL` repository implementation for task and application storage.
//!
//! Every conditional write is a single `UPDATE ... WHERE id = ? AND
//! status = ?` (or guarded `DELETE`) statement, so the guard and the
//! mutation are atomic without explicit locking.

use super::{
    models::{ApplicationRow, ApplicationWriteRow, TaskRow, TaskWriteRow},
    schema::{task_applications, tasks},
};
use crate::identity::UserId;
use crate::task::{
    domain::{
        ApplicantContact, Application, ApplicationId, ApplicationStatus,
        PersistedApplicationData, PersistedTaskData, Reward, Task, TaskId, TaskKind, TaskStatus,
    },
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, not, select};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// Partial unique index enforcing one open application per pair.
const OPEN_APPLICATION_INDEX: &str = "idx_task_applications_open_unique";

/// Statuses that keep an application open.
const OPEN_STATUSES: [&str; 2] = ["pending", "accepted"];

/// `PostgreSQL`-backed board repository.
#[derive(Debug, Clone)]
pub struct PostgresBoardRepository {
    pool: BoardPgPool,
}

impl PostgresBoardRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardRepositoryError::persistence)?
    }
}

#[async_trait]
impl BoardRepository for PostgresBoardRepository {
    async fn insert_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BoardRepositoryError::DuplicateTask(task_id)
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(BoardRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_open_tasks(&self, now: DateTime<Utc>) -> BoardRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::status.eq(TaskStatus::Active.as_str()))
                .filter(tasks::deadline.gt(now))
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(BoardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_tasks_by_creator(&self, creator: UserId) -> BoardRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::creator_id.eq(creator.into_inner()))
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(BoardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update_task(&self, task: &Task, expected: TaskStatus) -> BoardRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(task);
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::status.eq(expected.as_str())),
            )
            .set(&row)
            .execute(connection)
            .map_err(BoardRepositoryError::persistence)?;

            if affected == 0 {
                return Err(task_write_guard_failure(connection, task_id, expected));
            }
            Ok(())
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let open_applications = task_applications::table
                .filter(task_applications::task_id.eq(id.into_inner()))
                .filter(task_applications::status.eq_any(OPEN_STATUSES));
            let affected = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(not(exists(open_applications))),
            )
            .execute(connection)
            .map_err(BoardRepositoryError::persistence)?;

            if affected == 0 {
                let present = select(exists(
                    tasks::table.filter(tasks::id.eq(id.into_inner())),
                ))
                .get_result::<bool>(connection)
                .map_err(BoardRepositoryError::persistence)?;
                if present {
                    return Err(BoardRepositoryError::OpenApplicationsRemain(id));
                }
                return Err(BoardRepositoryError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn insert_application(&self, application: &Application) -> BoardRepositoryResult<()> {
        let application_id = application.id();
        let task_id = application.task_id();
        let applicant_id = application.applicant_id();
        let row = application_to_row(application);
        self.run_blocking(move |connection| {
            // Reporting-only pre-check: the partial unique index still
            // enforces the rule in the window between check and insert.
            let already_open = select(exists(
                task_applications::table
                    .filter(task_applications::task_id.eq(task_id.into_inner()))
                    .filter(task_applications::applicant_id.eq(applicant_id.into_inner()))
                    .filter(task_applications::status.eq_any(OPEN_STATUSES)),
            ))
            .get_result::<bool>(connection)
            .map_err(BoardRepositoryError::persistence)?;
            if already_open {
                return Err(BoardRepositoryError::OpenApplicationExists {
                    task_id,
                    applicant_id,
                });
            }

            diesel::insert_into(task_applications::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_open_application_violation(info.as_ref()) =>
                    {
                        BoardRepositoryError::OpenApplicationExists {
                            task_id,
                            applicant_id,
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BoardRepositoryError::DuplicateApplication(application_id)
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> BoardRepositoryResult<Option<Application>> {
        self.run_blocking(move |connection| {
            let row = task_applications::table
                .filter(task_applications::id.eq(id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()
                .map_err(BoardRepositoryError::persistence)?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn list_applications_for_task(
        &self,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Vec<Application>> {
        self.run_blocking(move |connection| {
            let rows = task_applications::table
                .filter(task_applications::task_id.eq(task_id.into_inner()))
                .order(task_applications::created_at.asc())
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)
                .map_err(BoardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn list_applications_by_applicant(
        &self,
        applicant: UserId,
    ) -> BoardRepositoryResult<Vec<Application>> {
        self.run_blocking(move |connection| {
            let rows = task_applications::table
                .filter(task_applications::applicant_id.eq(applicant.into_inner()))
                .order(task_applications::created_at.desc())
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)
                .map_err(BoardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn find_accepted_application(
        &self,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Option<Application>> {
        self.run_blocking(move |connection| {
            let row = task_applications::table
                .filter(task_applications::task_id.eq(task_id.into_inner()))
                .filter(task_applications::status.eq(ApplicationStatus::Accepted.as_str()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()
                .map_err(BoardRepositoryError::persistence)?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn update_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> BoardRepositoryResult<()> {
        let application_id = application.id();
        let row = application_to_row(application);
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                task_applications::table
                    .filter(task_applications::id.eq(application_id.into_inner()))
                    .filter(task_applications::status.eq(expected.as_str())),
            )
            .set(&row)
            .execute(connection)
            .map_err(BoardRepositoryError::persistence)?;

            if affected == 0 {
                return Err(application_write_guard_failure(
                    connection,
                    application_id,
                    expected,
                ));
            }
            Ok(())
        })
        .await
    }

    async fn reject_pending(
        &self,
        task_id: TaskId,
        except: Option<ApplicationId>,
        now: DateTime<Utc>,
    ) -> BoardRepositoryResult<Vec<Application>> {
        // The nil UUID can never collide with a generated application ID,
        // so "no exception" folds into the same statement.
        let except_id = except.map_or_else(uuid::Uuid::nil, ApplicationId::into_inner);
        self.run_blocking(move |connection| {
            let rows = diesel::update(
                task_applications::table
                    .filter(task_applications::task_id.eq(task_id.into_inner()))
                    .filter(task_applications::id.ne(except_id))
                    .filter(task_applications::status.eq(ApplicationStatus::Pending.as_str())),
            )
            .set((
                task_applications::status.eq(ApplicationStatus::Rejected.as_str()),
                task_applications::updated_at.eq(now),
            ))
            .get_results::<ApplicationRow>(connection)
            .map_err(BoardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn revert_application(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        to: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> BoardRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                task_applications::table
                    .filter(task_applications::id.eq(id.into_inner()))
                    .filter(task_applications::status.eq(expected.as_str())),
            )
            .set((
                task_applications::status.eq(to.as_str()),
                task_applications::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(BoardRepositoryError::persistence)?;

            if affected == 0 {
                return Err(application_write_guard_failure(connection, id, expected));
            }
            Ok(())
        })
        .await
    }
}

/// Distinguishes a missing task from a stale guard after a zero-row write.
fn task_write_guard_failure(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: TaskStatus,
) -> BoardRepositoryError {
    let present = select(exists(
        tasks::table.filter(tasks::id.eq(task_id.into_inner())),
    ))
    .get_result::<bool>(connection);
    match present {
        Ok(true) => BoardRepositoryError::TaskStatusStale { task_id, expected },
        Ok(false) => BoardRepositoryError::TaskNotFound(task_id),
        Err(err) => BoardRepositoryError::persistence(err),
    }
}

/// Distinguishes a missing application from a stale guard after a
/// zero-row write.
fn application_write_guard_failure(
    connection: &mut PgConnection,
    application_id: ApplicationId,
    expected: ApplicationStatus,
) -> BoardRepositoryError {
    let present = select(exists(
        task_applications::table.filter(task_applications::id.eq(application_id.into_inner())),
    ))
    .get_result::<bool>(connection);
    match present {
        Ok(true) => BoardRepositoryError::ApplicationStatusStale {
            application_id,
            expected,
        },
        Ok(false) => BoardRepositoryError::ApplicationNotFound(application_id),
        Err(err) => BoardRepositoryError::persistence(err),
    }
}

fn is_open_application_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == OPEN_APPLICATION_INDEX)
}

fn task_to_row(task: &Task) -> TaskWriteRow {
    TaskWriteRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        location: task.location().to_owned(),
        reward: task.reward().amount(),
        deadline: task.deadline(),
        task_type: task.kind().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        creator_id: task.creator_id().into_inner(),
        creator_name: task.creator_name().to_owned(),
        assigned_to: task.assigned_to().map(UserId::into_inner),
        assigned_at: task.assigned_at(),
        completed_at: task.completed_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> BoardRepositoryResult<Task> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(BoardRepositoryError::persistence)?;
    let kind =
        TaskKind::try_from(row.task_type.as_str()).map_err(BoardRepositoryError::persistence)?;
    let reward = Reward::new(row.reward).map_err(BoardRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        location: row.location,
        reward,
        deadline: row.deadline,
        kind,
        status,
        creator_id: UserId::from_uuid(row.creator_id),
        creator_name: row.creator_name,
        assigned_to: row.assigned_to.map(UserId::from_uuid),
        assigned_at: row.assigned_at,
        completed_at: row.completed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn application_to_row(application: &Application) -> ApplicationWriteRow {
    ApplicationWriteRow {
        id: application.id().into_inner(),
        task_id: application.task_id().into_inner(),
        applicant_id: application.applicant_id().into_inner(),
        applicant_name: application.applicant_name().to_owned(),
        applicant_email: application.contact().email().to_owned(),
        applicant_phone: application.contact().phone().map(str::to_owned),
        proposal: application.proposal().to_owned(),
        status: application.status().as_str().to_owned(),
        created_at: application.created_at(),
        updated_at: application.updated_at(),
    }
}

fn row_to_application(row: ApplicationRow) -> BoardRepositoryResult<Application> {
    let status = ApplicationStatus::try_from(row.status.as_str())
        .map_err(BoardRepositoryError::persistence)?;
    let contact = ApplicantContact::new(row.applicant_email, row.applicant_phone)
        .map_err(BoardRepositoryError::persistence)?;

    Ok(Application::from_persisted(PersistedApplicationData {
        id: ApplicationId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        applicant_id: UserId::from_uuid(row.applicant_id),
        applicant_name: row.applicant_name,
        contact,
        proposal: row.proposal,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
