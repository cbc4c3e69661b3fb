//! `PostgreSQL` adapters for task and application persistence.

mod models;
mod repository;
mod schema;

pub use repository::{BoardPgPool, PostgresBoardRepository};
