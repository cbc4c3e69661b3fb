//! Shared test helpers for in-memory integration tests.

use agora::identity::UserId;
use agora::notification::adapters::memory::InMemoryNotificationStore;
use agora::task::{
    adapters::memory::InMemoryBoardRepository,
    domain::{Application, NewTaskSpec, Task, TaskId, TaskKind},
    services::{ApplyRequest, MarketplaceService},
};
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use std::sync::Arc;

/// Marketplace service wired to in-memory adapters.
pub type TestMarketplace =
    MarketplaceService<InMemoryBoardRepository, InMemoryNotificationStore, DefaultClock>;

/// Service plus handles on its backing stores for direct inspection.
pub struct Harness {
    /// Orchestrator under test.
    pub service: TestMarketplace,
    /// Backing notification store.
    pub notifications: Arc<InMemoryNotificationStore>,
}

/// Provides a fresh marketplace harness for each test.
#[fixture]
pub fn harness() -> Harness {
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let service = MarketplaceService::new(
        Arc::new(InMemoryBoardRepository::new()),
        notifications.clone(),
        Arc::new(DefaultClock),
    );
    Harness {
        service,
        notifications,
    }
}

/// Posts a standard week-long task for the given creator.
pub async fn post_task(service: &TestMarketplace, creator: UserId) -> Task {
    service
        .create_task(NewTaskSpec {
            title: "Paint the fence".to_owned(),
            description: "Two coats, white".to_owned(),
            location: "Backyard".to_owned(),
            reward: 100,
            deadline: DefaultClock.utc() + Duration::days(7),
            kind: TaskKind::Normal,
            creator_id: creator,
            creator_name: "Ada".to_owned(),
        })
        .await
        .expect("task creation should succeed")
}

/// Applies to a task with standard contact details.
pub async fn apply(service: &TestMarketplace, task_id: TaskId, applicant: UserId) -> Application {
    service
        .apply(ApplyRequest::new(
            task_id,
            applicant,
            "Grace",
            "grace@example.com",
            "I have a ladder and time on Saturday.",
        ))
        .await
        .expect("application should succeed")
}
