//! Error types for notification parsing.

use thiserror::Error;

/// Error returned while parsing notification kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);

/// Error returned while parsing lifecycle events from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification event: {0}")]
pub struct ParseNotificationEventError(pub String);

/// Error returned while parsing related-entity kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown related entity kind: {0}")]
pub struct ParseRelatedKindError(pub String);
