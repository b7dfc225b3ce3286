//! Inspector client error types.

use thiserror::Error;

/// Errors from inspector client operations.
#[derive(Debug, Error)]
pub enum InspectorError {
    /// The WebSocket connection could not be established.
    #[error("failed to connect to inspector: {0}")]
    Connect(String),

    /// Transport-level communication error.
    #[error("inspector transport error: {0}")]
    Transport(String),

    /// A command timed out waiting for its response.
    #[error("inspector command timed out: {method}")]
    Timeout {
        /// The command that timed out.
        method: String,
    },

    /// The debuggee rejected a command.
    #[error("inspector rejected command: {message}")]
    Rpc {
        /// The rejection message from the debuggee.
        message: String,
    },

    /// The inspector socket is closed.
    #[error("inspector connection closed")]
    Closed,
}
