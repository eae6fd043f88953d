//! # Player Error Types
//!
//! Errors surfaced synchronously by the playback adapter. None of them are
//! retried internally; teardown operations never produce them.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during player operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The media data source or configuration is malformed or unsupported.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation requires a state the player is not in
    /// (e.g. `load` before a media element is attached).
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The player has been destroyed and accepts no further work.
    #[error("Player has been destroyed")]
    Destroyed,

    /// The attached media element rejected the operation.
    #[error("Media element error: {0}")]
    MediaElement(#[from] BridgeError),
}

impl PlayerError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, PlayerError::InvalidArgument(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, PlayerError::IllegalState(_))
    }
}

impl From<core_runtime::Error> for PlayerError {
    fn from(err: core_runtime::Error) -> Self {
        match err {
            core_runtime::Error::Config(message) => PlayerError::InvalidArgument(message),
        }
    }
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_become_invalid_argument() {
        let err: PlayerError = core_runtime::Error::Config("bad interval".into()).into();
        assert!(err.is_invalid_argument());
        assert!(!err.is_illegal_state());
    }

    #[test]
    fn bridge_errors_are_wrapped() {
        let err: PlayerError = BridgeError::NotAllowed("autoplay".into()).into();
        assert_eq!(
            err.to_string(),
            "Media element error: Operation not allowed: autoplay"
        );
    }
}
