//! Unit tests for domain construction and validation.

use crate::identity::UserId;
use crate::task::domain::{
    ApplicantContact, Application, ApplicationStatus, BoardDomainError, NewApplicationSpec,
    NewTaskSpec, Rating, Reward, Task, TaskEdit, TaskId, TaskKind, TaskStatus, TransitionError,
    ValidationError,
};
use chrono::Duration;
use eyre::ensure;
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn spec(clock: &DefaultClock) -> NewTaskSpec {
    NewTaskSpec {
        title: "Assemble a wardrobe".to_owned(),
        description: "Flat-pack, instructions included".to_owned(),
        location: "Kreuzberg".to_owned(),
        reward: 45,
        deadline: clock.utc() + Duration::days(3),
        kind: TaskKind::Normal,
        creator_id: UserId::new(),
        creator_name: "Ada".to_owned(),
    }
}

#[rstest]
fn post_trims_text_fields(clock: DefaultClock) -> eyre::Result<()> {
    let task = Task::post(
        NewTaskSpec {
            title: "  Assemble a wardrobe  ".to_owned(),
            ..spec(&clock)
        },
        &clock,
    )?;

    ensure!(task.title() == "Assemble a wardrobe");
    ensure!(task.assigned_to().is_none());
    ensure!(task.completed_at().is_none());
    Ok(())
}

#[rstest]
#[case::empty_title(NewTaskSpec { title: "   ".to_owned(), ..base() }, ValidationError::EmptyTitle)]
#[case::empty_description(NewTaskSpec { description: String::new(), ..base() }, ValidationError::EmptyDescription)]
#[case::empty_location(NewTaskSpec { location: "\t".to_owned(), ..base() }, ValidationError::EmptyLocation)]
#[case::empty_creator_name(NewTaskSpec { creator_name: String::new(), ..base() }, ValidationError::EmptyCreatorName)]
#[case::zero_reward(NewTaskSpec { reward: 0, ..base() }, ValidationError::NonPositiveReward(0))]
#[case::negative_reward(NewTaskSpec { reward: -5, ..base() }, ValidationError::NonPositiveReward(-5))]
fn post_rejects_malformed_input(
    clock: DefaultClock,
    #[case] broken: NewTaskSpec,
    #[case] expected: ValidationError,
) {
    let result = Task::post(broken, &clock);
    assert_eq!(result, Err(expected));
}

/// Baseline spec for the malformed-input cases; deadline is re-derived
/// inside each case so it stays in the future.
fn base() -> NewTaskSpec {
    spec(&DefaultClock)
}

#[rstest]
fn post_rejects_past_deadline(clock: DefaultClock) {
    let result = Task::post(
        NewTaskSpec {
            deadline: clock.utc() - Duration::hours(1),
            ..spec(&clock)
        },
        &clock,
    );
    assert_eq!(result, Err(ValidationError::DeadlineNotInFuture));
}

#[rstest]
fn edit_replaces_only_named_fields(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = Task::post(spec(&clock), &clock)?;
    let original_description = task.description().to_owned();

    let edit = TaskEdit::new().with_title("Assemble two wardrobes")?.with_reward(60)?;
    task.apply_edit(edit, &clock)?;

    ensure!(task.title() == "Assemble two wardrobes");
    ensure!(task.reward() == Reward::new(60)?);
    ensure!(task.description() == original_description);
    Ok(())
}

#[rstest]
fn edit_rejects_assigned_task(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = Task::post(spec(&clock), &clock)?;
    task.assign(UserId::new(), &clock)?;

    let edit = TaskEdit::new().with_title("Too late")?;
    let result = task.apply_edit(edit, &clock);

    ensure!(matches!(
        result,
        Err(BoardDomainError::Transition(
            TransitionError::TaskNotEditable { .. }
        ))
    ));
    Ok(())
}

#[rstest]
fn edit_rejects_past_deadline(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = Task::post(spec(&clock), &clock)?;

    let edit = TaskEdit::new().with_deadline(clock.utc() - Duration::minutes(1));
    let result = task.apply_edit(edit, &clock);

    ensure!(matches!(
        result,
        Err(BoardDomainError::Validation(
            ValidationError::DeadlineNotInFuture
        ))
    ));
    Ok(())
}

#[rstest]
fn submit_requires_proposal(clock: DefaultClock) -> eyre::Result<()> {
    let result = Application::submit(
        NewApplicationSpec {
            task_id: TaskId::new(),
            applicant_id: UserId::new(),
            applicant_name: "Grace".to_owned(),
            contact: ApplicantContact::new("grace@example.com", None)?,
            proposal: "  ".to_owned(),
        },
        &clock,
    );
    ensure!(result == Err(ValidationError::EmptyProposal));
    Ok(())
}

#[rstest]
fn contact_requires_email_and_drops_blank_phone() -> eyre::Result<()> {
    let missing_email = ApplicantContact::new("  ", None);
    ensure!(missing_email == Err(ValidationError::EmptyApplicantEmail));

    let blank_phone = ApplicantContact::new("grace@example.com", Some("   ".to_owned()))?;
    ensure!(blank_phone.phone().is_none());

    let kept_phone = ApplicantContact::new("grace@example.com", Some(" 030 1234 ".to_owned()))?;
    ensure!(kept_phone.phone() == Some("030 1234"));
    Ok(())
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(5, true)]
#[case(6, false)]
fn rating_bounds(#[case] score: u8, #[case] valid: bool) {
    assert_eq!(Rating::new(score).is_ok(), valid);
}

#[rstest]
fn statuses_serialize_to_their_storage_form() -> eyre::Result<()> {
    ensure!(serde_json::to_value(TaskStatus::Assigned)? == serde_json::json!("assigned"));
    ensure!(serde_json::to_value(ApplicationStatus::Pending)? == serde_json::json!("pending"));
    ensure!(serde_json::to_value(TaskKind::Joint)? == serde_json::json!("joint"));
    ensure!(TaskStatus::try_from("Assigned ")? == TaskStatus::Assigned);
    Ok(())
}
