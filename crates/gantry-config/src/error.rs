//! Configuration error types.

use thiserror::Error;

/// Errors from loading or validating the bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(String),

    /// A field has an unusable value.
    #[error("invalid config: {field}: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_parse_display() {
        let err = ConfigError::Parse("expected table".into());
        assert_eq!(err.to_string(), "config parse error: expected table");
    }

    #[test]
    fn error_validation_display() {
        let err = ConfigError::Validation {
            field: "server.port".into(),
            message: "out of range".into(),
        };
        assert_eq!(err.to_string(), "invalid config: server.port: out of range");
    }
}
