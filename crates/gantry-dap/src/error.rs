//! DAP protocol error types.

use thiserror::Error;

/// Errors from decoding or dispatching client DAP messages.
#[derive(Debug, Error)]
pub enum DapError {
    /// A frame could not be decoded as a DAP message.
    #[error("invalid DAP message: {0}")]
    InvalidMessage(String),

    /// The command is outside the supported set.
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// The command's arguments did not decode.
    #[error("invalid arguments for {command}: {message}")]
    InvalidArguments {
        /// The command whose arguments were rejected.
        command: String,
        /// The decode failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_message_display() {
        let err = DapError::InvalidMessage("unexpected null".into());
        assert_eq!(err.to_string(), "invalid DAP message: unexpected null");
    }

    #[test]
    fn error_unsupported_command_display() {
        let err = DapError::UnsupportedCommand("gotoTargets".into());
        assert_eq!(err.to_string(), "unsupported command: gotoTargets");
    }

    #[test]
    fn error_invalid_arguments_display() {
        let err = DapError::InvalidArguments {
            command: "launch".into(),
            message: "missing field `source`".into(),
        };
        assert!(err.to_string().contains("launch"));
        assert!(err.to_string().contains("missing field"));
    }
}
