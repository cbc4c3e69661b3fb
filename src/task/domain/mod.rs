//! Domain model for the task and application lifecycle.
//!
//! The marketplace domain models task posting, competing applications, the
//! accept-one-reject-rest rule, and assignment rollback while keeping all
//! infrastructure concerns outside of the domain boundary.

mod application;
mod error;
mod ids;
mod task;

pub use application::{
    ApplicantContact, Application, ApplicationStatus, NewApplicationSpec,
    PersistedApplicationData,
};
pub use error::{
    ParseApplicationStatusError, ParseTaskKindError, ParseTaskStatusError, TransitionError,
    ValidationError,
};
pub use ids::{ApplicationId, Rating, Reward, TaskId};
pub use task::{
    BoardDomainError, NewTaskSpec, PersistedTaskData, Task, TaskEdit, TaskKind, TaskStatus,
};
