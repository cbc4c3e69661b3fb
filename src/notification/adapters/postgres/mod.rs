//! `PostgreSQL` adapters for notification persistence.

mod models;
mod schema;
mod store;

pub use store::{NotificationPgPool, PostgresNotificationStore};
