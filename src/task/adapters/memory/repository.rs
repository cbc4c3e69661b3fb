//! In-memory board repository for tests and embedded use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::UserId;
use crate::task::{
    domain::{
        Application, ApplicationId, ApplicationStatus, PersistedApplicationData, Task, TaskId,
        TaskStatus,
    },
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};

/// Thread-safe in-memory board repository.
///
/// Guard checks run under the state lock, so conditional writes observe
/// the same atomicity the SQL adapter gets from single-statement updates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardRepository {
    state: Arc<RwLock<BoardState>>,
}

#[derive(Debug, Default)]
struct BoardState {
    tasks: HashMap<TaskId, Task>,
    applications: HashMap<ApplicationId, Application>,
    task_index: HashMap<TaskId, Vec<ApplicationId>>,
}

impl InMemoryBoardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write_state(&self) -> BoardRepositoryResult<std::sync::RwLockWriteGuard<'_, BoardState>> {
        self.state.write().map_err(|err| {
            BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_state(&self) -> BoardRepositoryResult<std::sync::RwLockReadGuard<'_, BoardState>> {
        self.state.read().map_err(|err| {
            BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Rebuilds an application with replaced status and update timestamp.
fn with_status(application: &Application, status: ApplicationStatus, now: DateTime<Utc>) -> Application {
    Application::from_persisted(PersistedApplicationData {
        id: application.id(),
        task_id: application.task_id(),
        applicant_id: application.applicant_id(),
        applicant_name: application.applicant_name().to_owned(),
        contact: application.contact().clone(),
        proposal: application.proposal().to_owned(),
        status,
        created_at: application.created_at(),
        updated_at: now,
    })
}

fn open_application_for_pair(
    state: &BoardState,
    task_id: TaskId,
    applicant_id: UserId,
) -> bool {
    state
        .task_index
        .get(&task_id)
        .is_some_and(|ids| {
            ids.iter()
                .filter_map(|id| state.applications.get(id))
                .any(|app| app.applicant_id() == applicant_id && app.status().is_open())
        })
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    async fn insert_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(BoardRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_open_tasks(&self, now: DateTime<Utc>) -> BoardRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let mut open: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.is_open_at(now))
            .cloned()
            .collect();
        open.sort_by_key(|task| std::cmp::Reverse(task.created_at()));
        Ok(open)
    }

    async fn list_tasks_by_creator(&self, creator: UserId) -> BoardRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.creator_id() == creator)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| std::cmp::Reverse(task.created_at()));
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task, expected: TaskStatus) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .tasks
            .get(&task.id())
            .ok_or(BoardRepositoryError::TaskNotFound(task.id()))?;
        if stored.status() != expected {
            return Err(BoardRepositoryError::TaskStatusStale {
                task_id: task.id(),
                expected,
            });
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.tasks.contains_key(&id) {
            return Err(BoardRepositoryError::TaskNotFound(id));
        }
        let has_open = state.task_index.get(&id).is_some_and(|ids| {
            ids.iter()
                .filter_map(|app_id| state.applications.get(app_id))
                .any(|app| app.status().is_open())
        });
        if has_open {
            return Err(BoardRepositoryError::OpenApplicationsRemain(id));
        }
        if let Some(ids) = state.task_index.remove(&id) {
            for app_id in ids {
                state.applications.remove(&app_id);
            }
        }
        state.tasks.remove(&id);
        Ok(())
    }

    async fn insert_application(&self, application: &Application) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.applications.contains_key(&application.id()) {
            return Err(BoardRepositoryError::DuplicateApplication(application.id()));
        }
        if open_application_for_pair(&state, application.task_id(), application.applicant_id()) {
            return Err(BoardRepositoryError::OpenApplicationExists {
                task_id: application.task_id(),
                applicant_id: application.applicant_id(),
            });
        }
        state
            .task_index
            .entry(application.task_id())
            .or_default()
            .push(application.id());
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> BoardRepositoryResult<Option<Application>> {
        let state = self.read_state()?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn list_applications_for_task(
        &self,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Vec<Application>> {
        let state = self.read_state()?;
        let mut applications: Vec<Application> = state
            .task_index
            .get(&task_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.applications.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        applications.sort_by_key(Application::created_at);
        Ok(applications)
    }

    async fn list_applications_by_applicant(
        &self,
        applicant: UserId,
    ) -> BoardRepositoryResult<Vec<Application>> {
        let state = self.read_state()?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|app| app.applicant_id() == applicant)
            .cloned()
            .collect();
        applications.sort_by_key(|app| std::cmp::Reverse(app.created_at()));
        Ok(applications)
    }

    async fn find_accepted_application(
        &self,
        task_id: TaskId,
    ) -> BoardRepositoryResult<Option<Application>> {
        let state = self.read_state()?;
        let accepted = state
            .task_index
            .get(&task_id)
            .and_then(|ids| {
                ids.iter()
                    .filter_map(|id| state.applications.get(id))
                    .find(|app| app.status() == ApplicationStatus::Accepted)
            })
            .cloned();
        Ok(accepted)
    }

    async fn update_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .applications
            .get(&application.id())
            .ok_or(BoardRepositoryError::ApplicationNotFound(application.id()))?;
        if stored.status() != expected {
            return Err(BoardRepositoryError::ApplicationStatusStale {
                application_id: application.id(),
                expected,
            });
        }
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn reject_pending(
        &self,
        task_id: TaskId,
        except: Option<ApplicationId>,
        now: DateTime<Utc>,
    ) -> BoardRepositoryResult<Vec<Application>> {
        let mut state = self.write_state()?;
        let candidates: Vec<ApplicationId> = state
            .task_index
            .get(&task_id)
            .map(|ids| {
                ids.iter()
                    .filter(|id| Some(**id) != except)
                    .filter(|id| {
                        state
                            .applications
                            .get(id)
                            .is_some_and(|app| app.status() == ApplicationStatus::Pending)
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        let mut rejected = Vec::with_capacity(candidates.len());
        for id in candidates {
            if let Some(app) = state.applications.get(&id) {
                let updated = with_status(app, ApplicationStatus::Rejected, now);
                state.applications.insert(id, updated.clone());
                rejected.push(updated);
            }
        }
        Ok(rejected)
    }

    async fn revert_application(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        to: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> BoardRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .applications
            .get(&id)
            .ok_or(BoardRepositoryError::ApplicationNotFound(id))?;
        if stored.status() != expected {
            return Err(BoardRepositoryError::ApplicationStatusStale {
                application_id: id,
                expected,
            });
        }
        let reverted = with_status(stored, to, now);
        state.applications.insert(id, reverted);
        Ok(())
    }
}
