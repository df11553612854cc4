//! Error types for the timer core
//!
//! Validation and precondition failures are surfaced synchronously to the
//! caller. Dropped commands are not errors on their own; callers only see
//! them as a missing acknowledgment.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid precondition: {0}")]
    InvalidPrecondition(String),

    #[error("No acknowledgment received for {0}")]
    Unacknowledged(String),

    #[error("Unknown timer: {0}")]
    UnknownTimer(String),

    #[error("Invalid timer definitions: {0}")]
    InvalidDefinitions(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimerError>;
