//! gantry-launcher — starts and supervises the debuggee process.
//!
//! The debuggee is spawned with its inspector listening on an ephemeral
//! local port in wait-for-debugger mode, so no code executes before the
//! bridge attaches. The inspector WebSocket URL is discovered from the
//! runtime's stderr banner.

pub mod error;
pub mod launcher;

// Re-export key types for convenience.
pub use error::LaunchError;
pub use launcher::{launch, LaunchEvent, LaunchSpec, LaunchedProcess, Sandbox};
