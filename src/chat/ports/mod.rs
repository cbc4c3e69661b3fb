//! Port contracts for the chat context.

pub mod repository;

pub use repository::{ChatRepository, ChatRepositoryError, ChatRepositoryResult};
