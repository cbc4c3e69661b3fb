//! Task-scoped chat rooms with lazy, idempotent provisioning.
//!
//! Rooms are created on the first "message the other party" action and
//! keyed by the directional (task, creator, participant) triple. Message
//! exchange is a plain append-and-list; the engine gives no delivery or
//! ordering guarantees beyond per-room timestamps. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Provisioning service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
