//! DAP protocol message types.
//!
//! Implements the Debug Adapter Protocol message structures with
//! serde Serialize/Deserialize support, covering the subset of the
//! protocol the bridge speaks to its client.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Base protocol messages
// ---------------------------------------------------------------------------

/// A DAP request message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Sequence number assigned by the client.
    pub seq: i64,
    /// Always "request".
    #[serde(rename = "type")]
    pub message_type: String,
    /// The command to execute.
    pub command: String,
    /// Command arguments (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

/// A DAP response message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Sequence number assigned by the session.
    pub seq: i64,
    /// Always "response".
    #[serde(rename = "type")]
    pub message_type: String,
    /// Sequence number of the corresponding request.
    pub request_seq: i64,
    /// Whether the request was successful.
    pub success: bool,
    /// The command this response is for.
    pub command: String,
    /// Error message if `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response body (command-specific).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// A DAP event message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Sequence number assigned by the session.
    pub seq: i64,
    /// Always "event".
    #[serde(rename = "type")]
    pub message_type: String,
    /// The event type.
    pub event: String,
    /// Event body (event-specific).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Request arguments
// ---------------------------------------------------------------------------

/// Arguments for the `launch` request.
///
/// Exactly one of `program` / `code` must be supplied; the session rejects
/// a launch that carries neither.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchArguments {
    /// Path to the program to debug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Inline source text to debug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Working directory for the debuggee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Append a synthetic call to the program's `main` entry function.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_main: Option<bool>,
    /// Arguments for the synthetic `main` call, by parameter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Map<String, serde_json::Value>>,
    /// Environment variables to pass to the debuggee process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<std::collections::HashMap<String, String>>,
}

/// Arguments for the `setBreakpoints` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsArguments {
    /// The source to set breakpoints for.
    pub source: Source,
    /// Breakpoints to set (replaces all previous ones for this source).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Vec<SourceBreakpoint>>,
}

/// A source breakpoint (client-side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakpoint {
    /// The source line of the breakpoint (1-based).
    pub line: i64,
    /// Optional column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
}

/// Response body for `setBreakpoints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsResponseBody {
    /// Information about the breakpoints, in request order.
    pub breakpoints: Vec<BreakpointInfo>,
}

/// A breakpoint as reported back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointInfo {
    /// Identifier for the breakpoint within this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Whether the breakpoint has been verified.
    pub verified: bool,
    /// Line of the breakpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    /// Source of the breakpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

/// Arguments for the `scopes` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopesArguments {
    /// The frame to report scopes for.
    pub frame_id: i64,
}

/// Arguments for the `variables` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesArguments {
    /// The reference whose children are requested.
    pub variables_reference: i64,
}

/// Arguments for the `evaluate` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateArguments {
    /// The expression to evaluate.
    pub expression: String,
    /// Stack frame in whose context to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i64>,
    /// Context: "watch", "repl", "hover".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Response body for `evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponseBody {
    /// The rendered result.
    pub result: String,
    /// If > 0, the result has children accessed via this reference.
    pub variables_reference: i64,
}

// ---------------------------------------------------------------------------
// Runtime types
// ---------------------------------------------------------------------------

/// A thread in the debuggee. The bridge reports exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Unique identifier of the thread.
    pub id: i64,
    /// Human-readable name of the thread.
    pub name: String,
}

/// Response body for `threads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsResponseBody {
    /// The threads of the debuggee.
    pub threads: Vec<Thread>,
}

/// A source location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Short name of the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// File system path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A stack frame in the call stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Unique identifier for the stack frame.
    pub id: i64,
    /// Name of the frame (function name).
    pub name: String,
    /// Source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Line within the source (1-based).
    pub line: i64,
    /// Column within the source (1-based).
    pub column: i64,
}

/// Response body for `stackTrace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceResponseBody {
    /// The frames, topmost first.
    pub stack_frames: Vec<StackFrame>,
    /// Total number of frames.
    pub total_frames: i64,
}

/// A scope (container for variables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Name of the scope (e.g. "Local", "Closure").
    pub name: String,
    /// Variables reference for this scope.
    pub variables_reference: i64,
    /// Whether the scope is expensive to resolve.
    pub expensive: bool,
}

/// Response body for `scopes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopesResponseBody {
    /// The scopes of the frame, innermost first.
    pub scopes: Vec<Scope>,
}

/// A variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Name of the variable.
    pub name: String,
    /// Value of the variable as a string.
    pub value: String,
    /// Type of the variable.
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    /// If > 0, the variable has children accessed via this reference.
    pub variables_reference: i64,
}

/// Response body for `variables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesResponseBody {
    /// The child variables.
    pub variables: Vec<Variable>,
}

// ---------------------------------------------------------------------------
// Event bodies
// ---------------------------------------------------------------------------

/// Reason why the debuggee stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// A breakpoint (or a debugger statement) was hit.
    Breakpoint,
    /// A step request completed.
    Step,
    /// An exception occurred.
    Exception,
    /// A pause request was fulfilled.
    Pause,
}

/// Body of the `stopped` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEventBody {
    /// The reason for the stop.
    pub reason: StopReason,
    /// Thread that stopped.
    pub thread_id: i64,
    /// Whether all threads are stopped.
    pub all_threads_stopped: bool,
    /// Line the debuggee stopped on (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
}

/// Body of the `continued` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuedEventBody {
    /// Thread that continued.
    pub thread_id: i64,
    /// Whether all threads continued.
    pub all_threads_continued: bool,
}

/// Body of the `output` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEventBody {
    /// Output category: "console", "stdout", "stderr".
    pub category: String,
    /// The output text.
    pub output: String,
    /// Source location that generated the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Line in the source (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
}

/// Body of the `terminated` event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminatedEventBody {
    /// Result value recovered from the debuggee's entry function, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_request_serde() {
        let req = Request {
            seq: 1,
            message_type: "request".into(),
            command: "initialize".into(),
            arguments: Some(serde_json::json!({"clientID": "editor"})),
        };
        let json = serde_json::to_string(&req).unwrap();
        let decoded: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn protocol_response_serde() {
        let resp = Response {
            seq: 2,
            message_type: "response".into(),
            request_seq: 1,
            success: true,
            command: "initialize".into(),
            message: None,
            body: Some(serde_json::json!({})),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let decoded: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, decoded);
        // Unset optional fields stay off the wire.
        assert!(!json.contains("message"));
    }

    #[test]
    fn protocol_event_serde() {
        let evt = Event {
            seq: 3,
            message_type: "event".into(),
            event: "stopped".into(),
            body: Some(serde_json::json!({"reason": "breakpoint", "threadId": 1})),
        };
        let json = serde_json::to_string(&evt).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(evt, decoded);
    }

    #[test]
    fn protocol_launch_arguments_serde() {
        let json = r#"{
            "code": "let x = 1;\n",
            "cwd": "/tmp/work",
            "callMain": true,
            "args": {"n": 3},
            "env": {"TOKEN": "abc"}
        }"#;
        let args: LaunchArguments = serde_json::from_str(json).unwrap();
        assert_eq!(args.code.as_deref(), Some("let x = 1;\n"));
        assert_eq!(args.program, None);
        assert_eq!(args.call_main, Some(true));
        assert_eq!(args.args.unwrap()["n"], 3);
        assert_eq!(args.env.unwrap()["TOKEN"], "abc");
    }

    #[test]
    fn protocol_set_breakpoints_arguments_serde() {
        let json = r#"{
            "source": {"path": "/tmp/script.ts", "name": "script.ts"},
            "breakpoints": [{"line": 2}, {"line": 5, "column": 1}]
        }"#;
        let args: SetBreakpointsArguments = serde_json::from_str(json).unwrap();
        assert_eq!(args.source.path.as_deref(), Some("/tmp/script.ts"));
        let bps = args.breakpoints.unwrap();
        assert_eq!(bps.len(), 2);
        assert_eq!(bps[0].line, 2);
        assert_eq!(bps[1].column, Some(1));
    }

    #[test]
    fn protocol_stopped_event_serde() {
        let body = StoppedEventBody {
            reason: StopReason::Breakpoint,
            thread_id: 1,
            all_threads_stopped: true,
            line: Some(2),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"reason\":\"breakpoint\""));
        assert!(json.contains("\"threadId\":1"));
        let decoded: StoppedEventBody = serde_json::from_str(&json).unwrap();
        assert_eq!(body, decoded);
    }

    #[test]
    fn protocol_stop_reason_variants() {
        let reasons = vec![
            (StopReason::Breakpoint, "\"breakpoint\""),
            (StopReason::Step, "\"step\""),
            (StopReason::Exception, "\"exception\""),
            (StopReason::Pause, "\"pause\""),
        ];
        for (reason, expected_json) in reasons {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, expected_json);
            let decoded: StopReason = serde_json::from_str(&json).unwrap();
            assert_eq!(reason, decoded);
        }
    }

    #[test]
    fn protocol_stack_frame_serde() {
        let frame = StackFrame {
            id: 1,
            name: "main".into(),
            source: Some(Source {
                name: Some("script.ts".into()),
                path: Some("/tmp/script.ts".into()),
            }),
            line: 10,
            column: 1,
        };
        let json = serde_json::to_string(&frame).unwrap();
        let decoded: StackFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, decoded);
    }

    #[test]
    fn protocol_variable_serde() {
        let var = Variable {
            name: "counter".into(),
            value: "42".into(),
            variable_type: Some("number".into()),
            variables_reference: 0,
        };
        let json = serde_json::to_string(&var).unwrap();
        assert!(json.contains("\"type\":\"number\""));
        let decoded: Variable = serde_json::from_str(&json).unwrap();
        assert_eq!(var, decoded);
    }

    #[test]
    fn protocol_evaluate_serde() {
        let args: EvaluateArguments =
            serde_json::from_str(r#"{"expression": "x + y", "frameId": 1}"#).unwrap();
        assert_eq!(args.expression, "x + y");
        assert_eq!(args.frame_id, Some(1));
        assert_eq!(args.context, None);

        let body = EvaluateResponseBody {
            result: "42".into(),
            variables_reference: 0,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"variablesReference\":0"));
    }

    #[test]
    fn protocol_terminated_event_with_result() {
        let body = TerminatedEventBody {
            result: Some(serde_json::json!({"sum": 7})),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"result\""));

        let empty = TerminatedEventBody::default();
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }
}
