//! gantry-dap — Debug Adapter Protocol surface of the bridge.
//!
//! This crate implements the client-facing half of the bridge: DAP
//! message types, the closed command dispatch, the fixed capability
//! set, and the WebSocket text-frame codec.

pub mod capabilities;
pub mod codec;
pub mod command;
pub mod error;
pub mod protocol;

// Re-export key types for convenience.
pub use capabilities::{adapter_capabilities, Capabilities};
pub use codec::{decode_request, encode_message};
pub use command::DapCommand;
pub use error::DapError;
pub use protocol::*;
