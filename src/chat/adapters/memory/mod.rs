//! In-memory adapters for the chat context.

mod repository;

pub use repository::InMemoryChatRepository;
