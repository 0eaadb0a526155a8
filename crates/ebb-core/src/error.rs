// crates/ebb-core/src/error.rs

use thiserror::Error;

/// Protocol-wide error types for the Ebb Protocol.
#[derive(Debug, Error)]
pub enum EbbError {
    /// The epoch window has not opened yet.
    #[error("Epoch not open: {0}")]
    EpochNotOpen(String),

    /// The oracle price no longer matches the caller-supplied expected price.
    #[error("Price moved: {0}")]
    PriceMoved(String),

    /// Caller is not authorized for this operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A precondition on the current state was violated.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Price oracle query failure.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Checked arithmetic overflow or underflow.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// A state-mutating entry point was re-entered before completing.
    #[error("Reentrant call: {0}")]
    Reentrancy(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EbbError {
    fn from(e: serde_json::Error) -> Self {
        EbbError::Serialization(e.to_string())
    }
}
