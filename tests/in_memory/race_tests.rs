//! Concurrency behaviour of the conditional-write discipline.
//!
//! Racing operations run on spawned tasks of a multi-thread runtime so
//! the conditional writes genuinely interleave.

use super::helpers::{Harness, apply, harness, post_task};
use agora::identity::UserId;
use agora::task::domain::{ApplicationStatus, TaskStatus};
use agora::task::services::{ApplyRequest, MarketplaceError};
use eyre::ensure;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_accepts_elect_exactly_one_winner(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let task = post_task(&harness.service, creator).await;
    let first = apply(&harness.service, task.id(), UserId::new()).await;
    let second = apply(&harness.service, task.id(), UserId::new()).await;
    let service = Arc::new(harness.service);

    let accept_first = tokio::spawn({
        let service = service.clone();
        let application_id = first.id();
        async move { service.accept(application_id, creator).await }
    });
    let accept_second = tokio::spawn({
        let service = service.clone();
        let application_id = second.id();
        async move { service.accept(application_id, creator).await }
    });
    let first_result = accept_first.await?;
    let second_result = accept_second.await?;

    let successes = usize::from(first_result.is_ok()) + usize::from(second_result.is_ok());
    ensure!(successes == 1, "exactly one accept must win, got {successes}");

    let loser = if first_result.is_ok() {
        second_result
    } else {
        first_result
    };
    ensure!(
        matches!(loser, Err(MarketplaceError::Conflict(_))),
        "the losing accept must surface a conflict"
    );

    // The task ends assigned to the winner, with one acceptance.
    let task_after = service
        .find_task(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;
    ensure!(task_after.status() == TaskStatus::Assigned);
    let applications = service.applications_for_task(task.id(), creator).await?;
    let accepted: Vec<_> = applications
        .iter()
        .filter(|application| application.status() == ApplicationStatus::Accepted)
        .collect();
    ensure!(accepted.len() == 1);
    let winner = accepted
        .first()
        .ok_or_else(|| eyre::eyre!("winner should exist"))?;
    ensure!(task_after.assigned_to() == Some(winner.applicant_id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accept_racing_retract_never_assigns_a_withdrawn_applicant(
    harness: Harness,
) -> eyre::Result<()> {
    let creator = UserId::new();
    let applicant = UserId::new();
    let task = post_task(&harness.service, creator).await;
    let application = apply(&harness.service, task.id(), applicant).await;
    let service = Arc::new(harness.service);

    let accepting = tokio::spawn({
        let service = service.clone();
        let application_id = application.id();
        async move { service.accept(application_id, creator).await }
    });
    let retracting = tokio::spawn({
        let service = service.clone();
        let application_id = application.id();
        async move { service.retract(application_id, applicant).await }
    });
    let accept_result = accepting.await?;
    let retract_result = retracting.await?;

    // One of the two conditional writes on the pending application wins.
    ensure!(
        accept_result.is_ok() != retract_result.is_ok(),
        "accept and retract cannot both succeed"
    );

    let task_after = service
        .find_task(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;
    if accept_result.is_ok() {
        ensure!(task_after.status() == TaskStatus::Assigned);
        ensure!(task_after.assigned_to() == Some(applicant));
    } else {
        ensure!(task_after.status() == TaskStatus::Active);
        ensure!(task_after.assigned_to().is_none());
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_applications_from_one_user_store_once(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let applicant = UserId::new();
    let task = post_task(&harness.service, creator).await;
    let service = Arc::new(harness.service);

    let spawn_apply = |service: Arc<super::helpers::TestMarketplace>| {
        let task_id = task.id();
        tokio::spawn(async move {
            service
                .apply(ApplyRequest::new(
                    task_id,
                    applicant,
                    "Grace",
                    "grace@example.com",
                    "I can do this.",
                ))
                .await
        })
    };

    let first_handle = spawn_apply(service.clone());
    let second_handle = spawn_apply(service.clone());
    let first = first_handle.await?;
    let second = second_handle.await?;

    ensure!(
        first.is_ok() != second.is_ok(),
        "exactly one concurrent application may be stored"
    );
    let stored = service.applications_for_task(task.id(), creator).await?;
    ensure!(stored.len() == 1);
    Ok(())
}
