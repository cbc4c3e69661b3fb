//! In-memory adapter integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `lifecycle_tests`: End-to-end task/application flows and invariants
//! - `race_tests`: Concurrent conditional-write behaviour
//! - `notification_tests`: Dispatch fan-out and idempotency
//! - `chat_tests`: Room provisioning and messaging

mod in_memory {
    pub mod helpers;

    mod chat_tests;
    mod lifecycle_tests;
    mod notification_tests;
    mod race_tests;
}
