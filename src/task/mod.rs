//! Task and application lifecycle management.
//!
//! This module owns the marketplace's core state rules: posting tasks,
//! competing applications, the accept-one-reject-rest rule, assignment
//! cancellation, and completion. Every multi-step transition is a
//! sequence of conditional writes so concurrent callers lose races
//! instead of corrupting state. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The lifecycle orchestrator in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
