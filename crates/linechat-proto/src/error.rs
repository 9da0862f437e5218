//! Error types for chat session operations.

use std::io;
use std::time::Duration;

use crate::state::{Operation, SessionState};

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Session error types.
///
/// Business-level rejections from the server (a taken username, a refused
/// message) are not errors; they come back as an unsuccessful
/// [`Outcome`](crate::Outcome).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the connection (refused, reset, closed mid-read).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connect or read did not complete in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Response did not match the format expected for its command.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation is not allowed in the current session state.
    #[error("{operation} is not allowed in the current state ({state})")]
    IllegalState {
        /// The rejected operation.
        operation: Operation,
        /// State the session was in.
        state: SessionState,
    },
}

impl Error {
    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns true for errors that leave the connection unusable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout(_))
    }

    /// Returns true if the operation was refused locally without any I/O.
    #[must_use]
    pub const fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState { .. })
    }
}
