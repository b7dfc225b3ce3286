//! The bridge's fixed capability set.

use serde::{Deserialize, Serialize};

/// Capabilities reported in the `initialize` response.
///
/// The set is fixed: the bridge never negotiates anything away, so the
/// fields are plain booleans rather than optionals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// The bridge handles `configurationDone`.
    pub supports_configuration_done_request: bool,
    /// Function breakpoints are not supported.
    pub supports_function_breakpoints: bool,
    /// Conditional breakpoints are not supported.
    pub supports_conditional_breakpoints: bool,
    /// Hit-count breakpoints are not supported.
    pub supports_hit_conditional_breakpoints: bool,
    /// Data breakpoints are not supported.
    pub supports_data_breakpoints: bool,
    /// Hover evaluation is supported.
    pub supports_evaluate_for_hovers: bool,
    /// Step-back is not supported.
    pub supports_step_back: bool,
    /// Setting variable values is not supported.
    pub supports_set_variable: bool,
    /// The bridge handles `terminate`.
    pub supports_terminate_request: bool,
    /// The debuggee is terminated on disconnect.
    pub support_terminate_debuggee: bool,
    /// Exception breakpoint filters (none).
    pub exception_breakpoint_filters: Vec<serde_json::Value>,
}

/// Build the capability set the bridge reports to every client.
pub fn adapter_capabilities() -> Capabilities {
    Capabilities {
        supports_configuration_done_request: true,
        supports_function_breakpoints: false,
        supports_conditional_breakpoints: false,
        supports_hit_conditional_breakpoints: false,
        supports_data_breakpoints: false,
        supports_evaluate_for_hovers: true,
        supports_step_back: false,
        supports_set_variable: false,
        supports_terminate_request: true,
        support_terminate_debuggee: true,
        exception_breakpoint_filters: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_fixed_set() {
        let caps = adapter_capabilities();
        assert!(caps.supports_configuration_done_request);
        assert!(caps.supports_terminate_request);
        assert!(caps.supports_evaluate_for_hovers);
        assert!(!caps.supports_function_breakpoints);
        assert!(!caps.supports_conditional_breakpoints);
        assert!(!caps.supports_data_breakpoints);
        assert!(!caps.supports_step_back);
        assert!(caps.exception_breakpoint_filters.is_empty());
    }

    #[test]
    fn capabilities_wire_spelling() {
        let json = serde_json::to_string(&adapter_capabilities()).unwrap();
        assert!(json.contains("\"supportsConfigurationDoneRequest\":true"));
        assert!(json.contains("\"supportsStepBack\":false"));
        assert!(json.contains("\"supportTerminateDebuggee\":true"));
    }
}
