//! Chat room provisioning over the in-memory adapter.

use agora::chat::adapters::memory::InMemoryChatRepository;
use agora::chat::services::ChatService;
use agora::identity::UserId;
use agora::task::domain::TaskId;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

type TestChat = ChatService<InMemoryChatRepository, DefaultClock>;

#[fixture]
fn chat() -> TestChat {
    ChatService::new(
        Arc::new(InMemoryChatRepository::new()),
        Arc::new(DefaultClock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_opens_converge_on_one_room(chat: TestChat) -> eyre::Result<()> {
    let task_id = Some(TaskId::new());
    let creator = UserId::new();
    let participant = UserId::new();

    let (first, second) = tokio::join!(
        chat.open_room(task_id, creator, participant),
        chat.open_room(task_id, creator, participant),
    );

    let first_room = first?;
    let second_room = second?;
    ensure!(first_room.id() == second_room.id());

    let rooms = chat.rooms_for_user(creator).await?;
    ensure!(rooms.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn per_task_rooms_stay_separate(chat: TestChat) -> eyre::Result<()> {
    let creator = UserId::new();
    let participant = UserId::new();

    let room_one = chat
        .open_room(Some(TaskId::new()), creator, participant)
        .await?;
    let room_two = chat
        .open_room(Some(TaskId::new()), creator, participant)
        .await?;
    let task_less = chat.open_room(None, creator, participant).await?;

    ensure!(room_one.id() != room_two.id());
    ensure!(room_one.id() != task_less.id());
    ensure!(chat.rooms_for_user(participant).await?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conversation_is_ordered_and_member_only(chat: TestChat) -> eyre::Result<()> {
    let creator = UserId::new();
    let participant = UserId::new();
    let room = chat.open_room(None, creator, participant).await?;

    chat.send_message(room.id(), creator, "Still available?").await?;
    chat.send_message(room.id(), participant, "Yes, tomorrow works.").await?;
    chat.send_message(room.id(), creator, "Great, see you then.").await?;

    let transcript = chat.messages(room.id(), participant).await?;
    ensure!(transcript.len() == 3);
    let bodies: Vec<_> = transcript
        .iter()
        .map(agora::chat::domain::ChatMessage::body)
        .collect();
    ensure!(bodies == ["Still available?", "Yes, tomorrow works.", "Great, see you then."]);
    Ok(())
}
