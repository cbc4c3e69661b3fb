//! Agora: marketplace task and application lifecycle engine.
//!
//! This crate implements the state rules behind a task marketplace: users
//! post tasks, others apply, the creator accepts exactly one applicant,
//! work proceeds, and the task is closed out. Lifecycle transitions fan
//! out into idempotent notifications and lazily provisioned chat rooms.
//!
//! # Architecture
//!
//! Agora follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`identity`]: Acting-user identifier passed explicitly into every call
//! - [`task`]: Task and application lifecycle, including the orchestrator
//! - [`notification`]: Idempotent, best-effort notification dispatch
//! - [`chat`]: Chat-room provisioning and message append/list

pub mod chat;
pub mod identity;
pub mod notification;
pub mod task;
