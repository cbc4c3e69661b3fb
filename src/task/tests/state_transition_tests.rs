//! Unit tests for task and application state machine validation.

use crate::identity::UserId;
use crate::task::domain::{
    ApplicantContact, Application, ApplicationStatus, NewApplicationSpec, NewTaskSpec, Task,
    TaskId, TaskKind, TaskStatus, TransitionError, ValidationError,
};
use chrono::Duration;
use eyre::{bail, ensure};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

const ALL_TASK_STATUSES: [TaskStatus; 4] = [
    TaskStatus::Active,
    TaskStatus::Assigned,
    TaskStatus::Completed,
    TaskStatus::Cancelled,
];

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn active_task(clock: DefaultClock) -> Result<Task, ValidationError> {
    Task::post(
        NewTaskSpec {
            title: "Paint the fence".to_owned(),
            description: "Two coats, white".to_owned(),
            location: "Backyard".to_owned(),
            reward: 100,
            deadline: clock.utc() + Duration::days(7),
            kind: TaskKind::Normal,
            creator_id: UserId::new(),
            creator_name: "Ada".to_owned(),
        },
        &clock,
    )
}

#[fixture]
fn pending_application(clock: DefaultClock) -> Result<Application, ValidationError> {
    Application::submit(
        NewApplicationSpec {
            task_id: TaskId::new(),
            applicant_id: UserId::new(),
            applicant_name: "Grace".to_owned(),
            contact: ApplicantContact::new("grace@example.com", None)?,
            proposal: "I have a ladder and time on Saturday.".to_owned(),
        },
        &clock,
    )
}

#[rstest]
#[case(TaskStatus::Active, TaskStatus::Active, false)]
#[case(TaskStatus::Active, TaskStatus::Assigned, true)]
#[case(TaskStatus::Active, TaskStatus::Completed, true)]
#[case(TaskStatus::Active, TaskStatus::Cancelled, true)]
#[case(TaskStatus::Assigned, TaskStatus::Active, true)]
#[case(TaskStatus::Assigned, TaskStatus::Assigned, false)]
#[case(TaskStatus::Assigned, TaskStatus::Completed, true)]
#[case(TaskStatus::Assigned, TaskStatus::Cancelled, true)]
#[case(TaskStatus::Completed, TaskStatus::Active, false)]
#[case(TaskStatus::Completed, TaskStatus::Assigned, false)]
#[case(TaskStatus::Completed, TaskStatus::Completed, false)]
#[case(TaskStatus::Completed, TaskStatus::Cancelled, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Active, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Assigned, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Completed, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Cancelled, false)]
fn task_can_transition_to_returns_expected(
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
#[case(TaskStatus::Active, false)]
#[case(TaskStatus::Assigned, false)]
#[case(TaskStatus::Completed, true)]
#[case(TaskStatus::Cancelled, true)]
fn task_is_terminal_returns_expected(#[case] status: TaskStatus, #[case] expected: bool) {
    assert_eq!(status.is_terminal(), expected);
}

#[rstest]
#[case(ApplicationStatus::Pending, ApplicationStatus::Pending, false)]
#[case(ApplicationStatus::Pending, ApplicationStatus::Accepted, true)]
#[case(ApplicationStatus::Pending, ApplicationStatus::Rejected, true)]
#[case(ApplicationStatus::Pending, ApplicationStatus::Cancelled, true)]
#[case(ApplicationStatus::Accepted, ApplicationStatus::Pending, false)]
#[case(ApplicationStatus::Accepted, ApplicationStatus::Accepted, false)]
#[case(ApplicationStatus::Accepted, ApplicationStatus::Rejected, false)]
#[case(ApplicationStatus::Accepted, ApplicationStatus::Cancelled, true)]
#[case(ApplicationStatus::Rejected, ApplicationStatus::Pending, false)]
#[case(ApplicationStatus::Rejected, ApplicationStatus::Accepted, false)]
#[case(ApplicationStatus::Rejected, ApplicationStatus::Rejected, false)]
#[case(ApplicationStatus::Rejected, ApplicationStatus::Cancelled, false)]
#[case(ApplicationStatus::Cancelled, ApplicationStatus::Pending, false)]
#[case(ApplicationStatus::Cancelled, ApplicationStatus::Accepted, false)]
#[case(ApplicationStatus::Cancelled, ApplicationStatus::Rejected, false)]
#[case(ApplicationStatus::Cancelled, ApplicationStatus::Cancelled, false)]
fn application_can_transition_to_returns_expected(
    #[case] from: ApplicationStatus,
    #[case] to: ApplicationStatus,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
#[case(ApplicationStatus::Pending, true)]
#[case(ApplicationStatus::Accepted, true)]
#[case(ApplicationStatus::Rejected, false)]
#[case(ApplicationStatus::Cancelled, false)]
fn application_is_open_returns_expected(
    #[case] status: ApplicationStatus,
    #[case] expected: bool,
) {
    assert_eq!(status.is_open(), expected);
}

#[rstest]
fn assign_moves_active_task_to_assigned(
    clock: DefaultClock,
    active_task: Result<Task, ValidationError>,
) -> eyre::Result<()> {
    let mut task = active_task?;
    let assignee = UserId::new();

    task.assign(assignee, &clock)?;

    ensure!(task.status() == TaskStatus::Assigned);
    ensure!(task.assigned_to() == Some(assignee));
    ensure!(task.assigned_at().is_some());
    Ok(())
}

#[rstest]
fn unassign_clears_assignment(
    clock: DefaultClock,
    active_task: Result<Task, ValidationError>,
) -> eyre::Result<()> {
    let mut task = active_task?;
    task.assign(UserId::new(), &clock)?;

    task.unassign(&clock)?;

    ensure!(task.status() == TaskStatus::Active);
    ensure!(task.assigned_to().is_none());
    ensure!(task.assigned_at().is_none());
    Ok(())
}

#[rstest]
fn complete_from_active_records_timestamp(
    clock: DefaultClock,
    active_task: Result<Task, ValidationError>,
) -> eyre::Result<()> {
    let mut task = active_task?;

    task.complete(&clock)?;

    ensure!(task.status() == TaskStatus::Completed);
    ensure!(task.completed_at().is_some());
    Ok(())
}

#[rstest]
#[case(TaskStatus::Completed)]
#[case(TaskStatus::Cancelled)]
fn terminal_task_rejects_all_transitions(
    #[case] terminal_status: TaskStatus,
    clock: DefaultClock,
    active_task: Result<Task, ValidationError>,
) -> eyre::Result<()> {
    let mut task = active_task?;
    if terminal_status == TaskStatus::Completed {
        task.complete(&clock)?;
    } else {
        task.cancel(&clock)?;
    }

    let task_id = task.id();
    for target in ALL_TASK_STATUSES {
        let result = match target {
            TaskStatus::Assigned => task.assign(UserId::new(), &clock),
            TaskStatus::Active => task.unassign(&clock),
            TaskStatus::Completed => task.complete(&clock),
            TaskStatus::Cancelled => task.cancel(&clock),
        };
        let expected = Err(TransitionError::InvalidTaskTransition {
            task_id,
            from: terminal_status,
            to: target,
        });
        if result != expected {
            bail!("expected {expected:?}, got {result:?}");
        }
        ensure!(task.status() == terminal_status);
    }
    Ok(())
}

#[rstest]
fn accept_requires_pending(
    clock: DefaultClock,
    pending_application: Result<Application, ValidationError>,
) -> eyre::Result<()> {
    let mut application = pending_application?;
    application.accept(&clock)?;
    ensure!(application.status() == ApplicationStatus::Accepted);

    let result = application.accept(&clock);
    let expected = Err(TransitionError::InvalidApplicationTransition {
        application_id: application.id(),
        from: ApplicationStatus::Accepted,
        to: ApplicationStatus::Accepted,
    });
    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    Ok(())
}

#[rstest]
fn retract_rejects_accepted_application(
    clock: DefaultClock,
    pending_application: Result<Application, ValidationError>,
) -> eyre::Result<()> {
    let mut application = pending_application?;
    application.accept(&clock)?;

    let result = application.retract(&clock);
    let expected = Err(TransitionError::InvalidApplicationTransition {
        application_id: application.id(),
        from: ApplicationStatus::Accepted,
        to: ApplicationStatus::Cancelled,
    });
    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(application.status() == ApplicationStatus::Accepted);
    Ok(())
}

#[rstest]
fn void_acceptance_requires_accepted(
    clock: DefaultClock,
    pending_application: Result<Application, ValidationError>,
) -> eyre::Result<()> {
    let mut application = pending_application?;

    let result = application.void_acceptance(&clock);
    let expected = Err(TransitionError::InvalidApplicationTransition {
        application_id: application.id(),
        from: ApplicationStatus::Pending,
        to: ApplicationStatus::Cancelled,
    });
    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }

    application.accept(&clock)?;
    application.void_acceptance(&clock)?;
    ensure!(application.status() == ApplicationStatus::Cancelled);
    Ok(())
}
