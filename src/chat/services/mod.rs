//! Application services for chat provisioning and messaging.

mod provisioner;

pub use provisioner::{ChatService, ChatServiceError, ChatServiceResult};
