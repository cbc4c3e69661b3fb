//! In-memory adapters for the task/application context.

mod repository;

pub use repository::InMemoryBoardRepository;
