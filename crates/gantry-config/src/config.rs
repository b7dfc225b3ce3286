use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// WebSocket server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5680
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Debuggee runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime binary used to execute debuggee scripts.
    #[serde(default = "default_runtime_command")]
    pub command: String,
    /// Per-command inspector response timeout (seconds, 1–120).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Bound on waiting for the debuggee's inspector URL (seconds, 1–120).
    #[serde(default = "default_launch_timeout_secs")]
    pub launch_timeout_secs: u64,
    /// Extra environment variables passed to every debuggee.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_runtime_command() -> String {
    "bun".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_launch_timeout_secs() -> u64 {
    10
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: default_runtime_command(),
            request_timeout_secs: default_request_timeout_secs(),
            launch_timeout_secs: default_launch_timeout_secs(),
            env: HashMap::new(),
        }
    }
}

/// Sandbox supervisor settings for the debuggee process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Whether the debuggee is wrapped by the supervisor.
    #[serde(default)]
    pub enabled: bool,
    /// Supervisor binary.
    #[serde(default)]
    pub command: Option<String>,
    /// Supervisor configuration file.
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    /// Extra supervisor arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Top-level bridge configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Debuggee runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Sandbox supervisor settings.
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5680);
        assert_eq!(config.runtime.command, "bun");
        assert_eq!(config.runtime.request_timeout_secs, 10);
        assert!(!config.sandbox.enabled);
    }

    #[test]
    fn config_partial_toml_keeps_defaults() {
        let config: BridgeConfig = toml::from_str("[server]\nport = 6000\n").unwrap();
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.runtime.command, "bun");
    }

    #[test]
    fn config_sandbox_section() {
        let config: BridgeConfig = toml::from_str(
            r#"
[sandbox]
enabled = true
command = "nsjail"
config_path = "/etc/gantry/jail.cfg"
extra_args = ["--quiet"]
"#,
        )
        .unwrap();
        assert!(config.sandbox.enabled);
        assert_eq!(config.sandbox.command.as_deref(), Some("nsjail"));
        assert_eq!(config.sandbox.extra_args, vec!["--quiet"]);
    }

    #[test]
    fn config_runtime_env() {
        let config: BridgeConfig =
            toml::from_str("[runtime.env]\nBASE_URL = \"http://localhost:8000\"\n").unwrap();
        assert_eq!(
            config.runtime.env.get("BASE_URL").map(String::as_str),
            Some("http://localhost:8000")
        );
    }
}
