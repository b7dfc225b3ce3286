use std::path::Path;

use crate::config::BridgeConfig;
use crate::error::ConfigError;

/// Load configuration from a TOML file.
///
/// A missing file yields the defaults; any other I/O failure, a parse
/// failure, or a validation failure is an error.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(BridgeConfig::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };
    load_from_str(&content)
}

/// Parse a TOML string directly into a validated [`BridgeConfig`].
pub fn load_from_str(toml_str: &str) -> Result<BridgeConfig, ConfigError> {
    let config: BridgeConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Reject configurations the bridge cannot run with.
fn validate(config: &BridgeConfig) -> Result<(), ConfigError> {
    if config.runtime.command.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "runtime.command".into(),
            message: "must not be empty".into(),
        });
    }
    for (field, value) in [
        (
            "runtime.request_timeout_secs",
            config.runtime.request_timeout_secs,
        ),
        (
            "runtime.launch_timeout_secs",
            config.runtime.launch_timeout_secs,
        ),
    ] {
        if !(1..=120).contains(&value) {
            return Err(ConfigError::Validation {
                field: field.into(),
                message: format!("must be between 1 and 120, got {value}"),
            });
        }
    }
    if config.sandbox.enabled && config.sandbox.command.is_none() {
        return Err(ConfigError::Validation {
            field: "sandbox.command".into(),
            message: "required when the sandbox is enabled".into(),
        });
    }
    Ok(())
}
