//! Persistence adapters for the notification context.
//!
//! Concrete implementations of the [`NotificationStore`] port:
//!
//! - [`memory::InMemoryNotificationStore`]: thread-safe in-memory storage
//!   for tests and embedded use
//! - [`postgres::PostgresNotificationStore`]: production `PostgreSQL`
//!   persistence using Diesel ORM
//!
//! [`NotificationStore`]: crate::notification::ports::NotificationStore

pub mod memory;
pub mod postgres;
