//! Notification fan-out produced by lifecycle transitions.

use super::helpers::{Harness, apply, harness, post_task};
use agora::identity::UserId;
use agora::notification::domain::NotificationEvent;
use agora::notification::ports::NotificationStore;
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_fan_out_reaches_each_party_once(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let winner_user = UserId::new();
    let loser_user = UserId::new();
    let task = post_task(&harness.service, creator).await;
    let winner = apply(&harness.service, task.id(), winner_user).await;
    apply(&harness.service, task.id(), loser_user).await;

    harness.service.accept(winner.id(), creator).await?;
    harness.service.mark_complete(task.id(), creator, None).await?;

    // Creator: one per application.
    let creator_inbox = harness.notifications.list_for_user(creator).await?;
    ensure!(creator_inbox.len() == 2);
    ensure!(creator_inbox
        .iter()
        .all(|notification| notification.event() == NotificationEvent::NewApplication));

    // Winner: accepted, then completed.
    let winner_inbox = harness.notifications.list_for_user(winner_user).await?;
    let winner_events: Vec<_> = winner_inbox
        .iter()
        .map(agora::notification::domain::Notification::event)
        .collect();
    ensure!(winner_events.contains(&NotificationEvent::ApplicationAccepted));
    ensure!(winner_events.contains(&NotificationEvent::TaskCompleted));
    ensure!(winner_inbox.len() == 2);

    // Loser: exactly the rejection.
    let loser_inbox = harness.notifications.list_for_user(loser_user).await?;
    ensure!(loser_inbox.len() == 1);
    let rejection = loser_inbox
        .first()
        .ok_or_else(|| eyre::eyre!("rejection notification should exist"))?;
    ensure!(rejection.event() == NotificationEvent::ApplicationRejected);
    ensure!(!rejection.is_read());
    ensure!(rejection.message().contains("Paint the fence"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignment_cancellation_notifies_the_former_assignee(
    harness: Harness,
) -> eyre::Result<()> {
    let creator = UserId::new();
    let applicant = UserId::new();
    let task = post_task(&harness.service, creator).await;
    let application = apply(&harness.service, task.id(), applicant).await;
    harness.service.accept(application.id(), creator).await?;

    harness.service.cancel_assignment(task.id(), creator).await?;

    let inbox = harness.notifications.list_for_user(applicant).await?;
    ensure!(inbox
        .iter()
        .any(|notification| notification.event() == NotificationEvent::AssignmentCancelled));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unread_count_tracks_mark_read(harness: Harness) -> eyre::Result<()> {
    let creator = UserId::new();
    let task = post_task(&harness.service, creator).await;
    apply(&harness.service, task.id(), UserId::new()).await;

    let inbox = harness.service.notifications();
    ensure!(inbox.unread_count(creator).await? == 1);

    let stored = inbox.list_for_user(creator).await?;
    let notification = stored
        .first()
        .ok_or_else(|| eyre::eyre!("notification should exist"))?;
    inbox.mark_read(notification.id(), creator).await?;

    ensure!(inbox.unread_count(creator).await? == 0);
    Ok(())
}
