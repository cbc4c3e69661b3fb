//! Idempotent, best-effort lifecycle notifications.
//!
//! Dispatch is keyed on (recipient, related entity, triggering event) so
//! retried lifecycle operations never duplicate a notification, and it
//! fails open: a missing or broken notification sink is logged and
//! swallowed rather than surfaced to the lifecycle caller. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Dispatch service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
