//! gantry-inspector — client for the debuggee's inspector protocol.
//!
//! This crate implements the debuggee-facing half of the bridge: a
//! WebSocket client that sends JSON-RPC-style commands, correlates
//! responses through a pending-request table, and demultiplexes
//! unsolicited events onto a channel for the debug session.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod protocol;

// Re-export key types for convenience.
pub use client::InspectorClient;
pub use dispatcher::{DispatchResult, Dispatcher};
pub use error::InspectorError;
pub use protocol::{
    CallFrame, ConsoleMessage, InspectorEvent, InspectorMessage, Location, ObjectRef,
    PropertyDescriptor, RemoteObject, RpcError, ScopeEntry, ScriptRecord,
};
