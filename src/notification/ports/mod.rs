//! Port contracts for the notification context.

pub mod store;

pub use store::{NotificationStore, NotificationStoreError, NotificationStoreResult};
