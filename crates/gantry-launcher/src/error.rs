//! Launcher error types.

use thiserror::Error;

/// Errors from starting the debuggee.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The debuggee process failed to start.
    #[error("failed to start debuggee: {0}")]
    Spawn(String),

    /// The inspector URL never appeared on the debuggee's stderr.
    #[error("timed out waiting for the inspector url")]
    InspectorUrlTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_spawn_display() {
        let err = LaunchError::Spawn("bun: No such file or directory".into());
        assert!(err.to_string().contains("failed to start debuggee"));
        assert!(err.to_string().contains("bun"));
    }

    #[test]
    fn error_url_timeout_display() {
        assert_eq!(
            LaunchError::InspectorUrlTimeout.to_string(),
            "timed out waiting for the inspector url"
        );
    }
}
