use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The host object is not in a state that accepts the operation
    /// (e.g. assigning a playback position before any media is loaded).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The host refused the operation by policy (e.g. autoplay blocked).
    #[error("Operation not allowed: {0}")]
    NotAllowed(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
