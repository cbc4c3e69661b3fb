//! Persistence adapters for the task/application context.
//!
//! Concrete implementations of the [`BoardRepository`] port:
//!
//! - [`memory::InMemoryBoardRepository`]: thread-safe in-memory storage
//!   for tests and embedded use
//! - [`postgres::PostgresBoardRepository`]: production `PostgreSQL`
//!   persistence using Diesel ORM
//!
//! [`BoardRepository`]: crate::task::ports::BoardRepository

pub mod memory;
pub mod postgres;
