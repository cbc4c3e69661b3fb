//! Domain model for task-scoped chat.

mod error;
mod ids;
mod message;
mod room;

pub use error::ChatDomainError;
pub use ids::{ChatMessageId, ChatRoomId};
pub use message::{ChatMessage, PersistedChatMessageData};
pub use room::{ChatRoom, PersistedChatRoomData, RoomKey};
