//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent taxonomy rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate entity in schema: {0}")]
    DuplicateEntity(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("cycle detected in supertype chain at: {0}")]
    CycleDetected(String),

    #[error("schema tree is empty, load a schema first")]
    EmptyTree,

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}
