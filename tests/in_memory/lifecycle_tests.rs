//! End-to-end lifecycle flows over the in-memory adapters.

use super::helpers::{Harness, apply, harness, post_task};
use agora::identity::UserId;
use agora::task::domain::{ApplicationStatus, TaskStatus};
use agora::task::services::MarketplaceError;
use eyre::ensure;
use rstest::rstest;

/// Asserts the assignment invariant: a task is assigned exactly when one
/// of its applications is accepted.
async fn assert_assignment_invariant(
    harness: &Harness,
    task_id: agora::task::domain::TaskId,
    creator: UserId,
) -> eyre::Result<()> {
    let task = harness
        .service
        .find_task(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;
    let accepted: Vec<_> = harness
        .service
        .applications_for_task(task_id, creator)
        .await?
        .into_iter()
        .filter(|application| application.status() == ApplicationStatus::Accepted)
        .collect();

    match task.status() {
        TaskStatus::Assigned => {
            ensure!(task.assigned_to().is_some(), "assigned task needs assignee");
            ensure!(
                accepted.len() == 1,
                "assigned task needs exactly one accepted application, found {}",
                accepted.len()
            );
        }
        _ => {
            ensure!(
                accepted.is_empty() || task.status() == TaskStatus::Completed,
                "only assigned or completed tasks may hold an acceptance"
            );
        }
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_marketplace_scenario(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let applicant_a = UserId::new();
    let applicant_b = UserId::new();

    // Task created active, reward 100, deadline in 7 days.
    let task = post_task(&harness.service, creator).await;
    ensure!(task.status() == TaskStatus::Active);
    ensure!(task.reward().amount() == 100);

    // Two competing applications.
    let application_a = apply(&harness.service, task.id(), applicant_a).await;
    let application_b = apply(&harness.service, task.id(), applicant_b).await;
    assert_assignment_invariant(&harness, task.id(), creator).await?;

    // Accepting A assigns the task and forecloses B.
    let outcome = harness.service.accept(application_a.id(), creator).await?;
    ensure!(outcome.task.status() == TaskStatus::Assigned);
    ensure!(outcome.task.assigned_to() == Some(applicant_a));
    ensure!(outcome.accepted.status() == ApplicationStatus::Accepted);
    assert_assignment_invariant(&harness, task.id(), creator).await?;

    let applications = harness
        .service
        .applications_for_task(task.id(), creator)
        .await?;
    for application in &applications {
        if application.id() == application_a.id() {
            ensure!(application.status() == ApplicationStatus::Accepted);
        } else {
            ensure!(application.status() == ApplicationStatus::Rejected);
        }
    }
    ensure!(applications.len() == 2);
    ensure!(applications
        .iter()
        .any(|application| application.id() == application_b.id()));

    // Completion is terminal.
    let completion = harness.service.mark_complete(task.id(), creator, None).await?;
    ensure!(completion.task.status() == TaskStatus::Completed);
    ensure!(completion.task.completed_at().is_some());

    let cancel_after = harness.service.cancel_assignment(task.id(), creator).await;
    ensure!(matches!(
        cancel_after,
        Err(MarketplaceError::InvalidTransition(_))
    ));

    // No further acceptance on a terminal task.
    let late_accept = harness
        .service
        .accept(application_b.id(), creator)
        .await;
    ensure!(matches!(
        late_accept,
        Err(MarketplaceError::InvalidTransition(_))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_assignment_restores_open_state(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let applicant = UserId::new();
    let task = post_task(&harness.service, creator).await;
    let application = apply(&harness.service, task.id(), applicant).await;

    harness.service.accept(application.id(), creator).await?;
    let reopened = harness.service.cancel_assignment(task.id(), creator).await?;

    ensure!(reopened.status() == TaskStatus::Active);
    ensure!(reopened.assigned_to().is_none());
    ensure!(reopened.assigned_at().is_none());
    assert_assignment_invariant(&harness, task.id(), creator).await?;

    // The freed applicant can apply again: the prior application is
    // cancelled and no longer binds the pair.
    apply(&harness.service, task.id(), applicant).await;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_listing_hides_expired_and_assigned_tasks(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let open_task = post_task(&harness.service, creator).await;
    let assigned_task = post_task(&harness.service, creator).await;
    let application = apply(&harness.service, assigned_task.id(), UserId::new()).await;
    harness.service.accept(application.id(), creator).await?;

    let listing = harness.service.list_open_tasks().await?;
    let ids: Vec<_> = listing.iter().map(agora::task::domain::Task::id).collect();

    ensure!(ids.contains(&open_task.id()));
    ensure!(!ids.contains(&assigned_task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn applicant_sees_own_applications(harness: Harness) -> eyre::Result<()> {
    let applicant = UserId::new();
    let task_one = post_task(&harness.service, UserId::new()).await;
    let task_two = post_task(&harness.service, UserId::new()).await;
    apply(&harness.service, task_one.id(), applicant).await;
    apply(&harness.service, task_two.id(), applicant).await;

    let mine = harness.service.applications_by_applicant(applicant).await?;

    ensure!(mine.len() == 2);
    ensure!(mine.iter().all(|application| application.applicant_id() == applicant));
    Ok(())
}
