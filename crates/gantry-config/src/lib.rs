//! gantry-config — configuration for the debug bridge.

pub mod config;
pub mod error;
pub mod load;

pub use config::{BridgeConfig, RuntimeConfig, SandboxConfig, ServerConfig};
pub use error::ConfigError;
pub use load::{load_config, load_from_str};
