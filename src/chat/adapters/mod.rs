//! Persistence adapters for the chat context.
//!
//! Concrete implementations of the [`ChatRepository`] port:
//!
//! - [`memory::InMemoryChatRepository`]: thread-safe in-memory storage
//!   for tests and embedded use
//! - [`postgres::PostgresChatRepository`]: production `PostgreSQL`
//!   persistence using Diesel ORM
//!
//! [`ChatRepository`]: crate::chat::ports::ChatRepository

pub mod memory;
pub mod postgres;
