//! `PostgreSQL` adapters for chat persistence.

mod models;
mod repository;
mod schema;

pub use repository::{ChatPgPool, PostgresChatRepository};
