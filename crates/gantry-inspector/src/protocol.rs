//! Inspector protocol message types.
//!
//! The debuggee runtime speaks a JSON-RPC-style protocol over its own
//! WebSocket: commands carry an `id`, responses echo it, and unsolicited
//! events carry a `method` with no `id`.

use serde::{Deserialize, Serialize};

/// A raw inspector message, before classification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InspectorMessage {
    /// Correlation id; present on responses, absent on events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Method name; present on commands and events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Command or event parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Result of a successful command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error of a failed command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// An error object in an inspector response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// The error message.
    pub message: String,
    /// The error code, when the runtime supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

/// A script registered by the debuggee, from the script-parsed event.
///
/// Records are only ever added during a session; the one whose `url` matches
/// the launched program identifies the main script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRecord {
    /// Runtime-assigned script identifier.
    pub script_id: String,
    /// Script URL (a file path for local scripts).
    #[serde(default)]
    pub url: String,
    /// First line of the script (0-based).
    #[serde(default)]
    pub start_line: i64,
    /// Last line of the script (0-based).
    #[serde(default)]
    pub end_line: i64,
    /// Content hash.
    #[serde(default)]
    pub hash: String,
}

/// A source location inside a script (inspector indexing, 0-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The script containing the location.
    pub script_id: String,
    /// 0-based line number.
    pub line_number: i64,
    /// 0-based column number.
    #[serde(default)]
    pub column_number: i64,
}

/// A reference to an object held by the runtime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// Handle for follow-up property requests; absent for primitives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// One entry of a call frame's scope chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// Scope kind: "local", "closure", "global", ...
    #[serde(rename = "type")]
    pub scope_type: String,
    /// The object holding the scope's bindings.
    pub object: ObjectRef,
    /// Optional scope name (e.g. a function name for closures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One stack entry of the paused debuggee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Handle for frame-scoped evaluation.
    pub call_frame_id: String,
    /// Function name; empty for anonymous frames.
    #[serde(default)]
    pub function_name: String,
    /// Where the frame is paused.
    pub location: Location,
    /// The frame's lexical scopes, innermost first.
    #[serde(default)]
    pub scope_chain: Vec<ScopeEntry>,
    /// The frame's `this` binding.
    #[serde(rename = "this")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub this_object: Option<ObjectRef>,
}

/// A value as described by the runtime (evaluate and getProperties results).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Value kind: "object", "string", "number", "undefined", ...
    #[serde(rename = "type")]
    #[serde(default)]
    pub object_type: String,
    /// Kind refinement: "array", "null", "error", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Class name for objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// The value itself, for primitives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Handle for follow-up property requests; present for objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// One property from a getProperties result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,
    /// Property value; absent for accessor-only properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<RemoteObject>,
}

/// A console message emitted by the debuggee.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Severity: "log", "warning", "error", ...
    #[serde(default)]
    pub level: String,
    /// Pre-rendered message text.
    #[serde(default)]
    pub text: String,
    /// Structured arguments, when the runtime supplies them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RemoteObject>>,
    /// 0-based line the message originated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    /// URL of the originating script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A typed unsolicited event from the debuggee.
///
/// Methods outside this set are dropped by the client with a debug log,
/// matching the bridge's contract of ignoring unrecognized events.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectorEvent {
    /// A script finished parsing.
    ScriptParsed(ScriptRecord),
    /// Execution paused.
    Paused {
        /// The runtime's pause reason string.
        reason: String,
        /// The full stack at the pause point, topmost first.
        call_frames: Vec<CallFrame>,
    },
    /// Execution resumed.
    Resumed,
    /// A console message was produced.
    Console(ConsoleMessage),
    /// An uncaught exception was thrown.
    ExceptionThrown {
        /// Rendered exception description.
        text: String,
    },
    /// A URL-pattern breakpoint resolved to a concrete location.
    BreakpointResolved {
        /// The inspector-side breakpoint id.
        breakpoint_id: String,
    },
    /// The inspector socket closed; the debuggee is gone.
    Closed,
}

impl InspectorEvent {
    /// Classify an unsolicited message by method. Returns `None` for
    /// methods the bridge does not consume.
    pub fn from_message(method: &str, params: serde_json::Value) -> Option<Self> {
        match method {
            "Debugger.scriptParsed" => {
                let record: ScriptRecord = serde_json::from_value(params).ok()?;
                Some(Self::ScriptParsed(record))
            }
            "Debugger.paused" => {
                let reason = params
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or_default()
                    .to_string();
                let call_frames = params
                    .get("callFrames")
                    .cloned()
                    .and_then(|f| serde_json::from_value(f).ok())
                    .unwrap_or_default();
                Some(Self::Paused {
                    reason,
                    call_frames,
                })
            }
            "Debugger.resumed" => Some(Self::Resumed),
            "Console.messageAdded" => {
                let message = params.get("message").cloned()?;
                let message: ConsoleMessage = serde_json::from_value(message).ok()?;
                Some(Self::Console(message))
            }
            "Runtime.exceptionThrown" => {
                let details = params.get("exceptionDetails")?;
                let text = details
                    .pointer("/exception/description")
                    .or_else(|| details.get("text"))
                    .and_then(|t| t.as_str())
                    .unwrap_or("Unknown exception")
                    .to_string();
                Some(Self::ExceptionThrown { text })
            }
            "Debugger.breakpointResolved" => {
                let breakpoint_id = params
                    .get("breakpointId")
                    .and_then(|b| b.as_str())?
                    .to_string();
                Some(Self::BreakpointResolved { breakpoint_id })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_message_classification() {
        let response: InspectorMessage =
            serde_json::from_str(r#"{"id": 3, "result": {"breakpointId": "bp1"}}"#).unwrap();
        assert_eq!(response.id, Some(3));
        assert!(response.method.is_none());

        let event: InspectorMessage = serde_json::from_str(
            r#"{"method": "Debugger.resumed", "params": {}}"#,
        )
        .unwrap();
        assert!(event.id.is_none());
        assert_eq!(event.method.as_deref(), Some("Debugger.resumed"));
    }

    #[test]
    fn protocol_error_response() {
        let msg: InspectorMessage = serde_json::from_str(
            r#"{"id": 1, "error": {"message": "Breakpoint not found", "code": -32000}}"#,
        )
        .unwrap();
        let err = msg.error.unwrap();
        assert_eq!(err.message, "Breakpoint not found");
        assert_eq!(err.code, Some(-32000));
    }

    #[test]
    fn protocol_script_parsed_event() {
        let params = serde_json::json!({
            "scriptId": "42",
            "url": "/tmp/gantry/script.ts",
            "startLine": 0,
            "endLine": 12,
            "hash": "abc123"
        });
        let event = InspectorEvent::from_message("Debugger.scriptParsed", params).unwrap();
        match event {
            InspectorEvent::ScriptParsed(record) => {
                assert_eq!(record.script_id, "42");
                assert_eq!(record.end_line, 12);
            }
            other => panic!("expected ScriptParsed, got {other:?}"),
        }
    }

    #[test]
    fn protocol_paused_event() {
        let params = serde_json::json!({
            "reason": "Breakpoint",
            "callFrames": [{
                "callFrameId": "frame:0",
                "functionName": "main",
                "location": {"scriptId": "42", "lineNumber": 2, "columnNumber": 0},
                "scopeChain": [
                    {"type": "local", "object": {"objectId": "obj:1"}},
                    {"type": "global", "object": {"objectId": "obj:2"}}
                ],
                "this": {"objectId": "obj:3"}
            }]
        });
        let event = InspectorEvent::from_message("Debugger.paused", params).unwrap();
        match event {
            InspectorEvent::Paused {
                reason,
                call_frames,
            } => {
                assert_eq!(reason, "Breakpoint");
                assert_eq!(call_frames.len(), 1);
                assert_eq!(call_frames[0].function_name, "main");
                assert_eq!(call_frames[0].location.line_number, 2);
                assert_eq!(call_frames[0].scope_chain[0].scope_type, "local");
            }
            other => panic!("expected Paused, got {other:?}"),
        }
    }

    #[test]
    fn protocol_paused_event_without_frames() {
        let event =
            InspectorEvent::from_message("Debugger.paused", serde_json::json!({"reason": "other"}))
                .unwrap();
        match event {
            InspectorEvent::Paused { call_frames, .. } => assert!(call_frames.is_empty()),
            other => panic!("expected Paused, got {other:?}"),
        }
    }

    #[test]
    fn protocol_console_message_event() {
        let params = serde_json::json!({
            "message": {
                "level": "log",
                "text": "hello",
                "line": 3,
                "url": "/tmp/gantry/script.ts"
            }
        });
        let event = InspectorEvent::from_message("Console.messageAdded", params).unwrap();
        match event {
            InspectorEvent::Console(msg) => {
                assert_eq!(msg.level, "log");
                assert_eq!(msg.text, "hello");
                assert_eq!(msg.line, Some(3));
            }
            other => panic!("expected Console, got {other:?}"),
        }
    }

    #[test]
    fn protocol_exception_event() {
        let params = serde_json::json!({
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"description": "Error: boom"}
            }
        });
        let event = InspectorEvent::from_message("Runtime.exceptionThrown", params).unwrap();
        assert_eq!(
            event,
            InspectorEvent::ExceptionThrown {
                text: "Error: boom".into()
            }
        );
    }

    #[test]
    fn protocol_unrecognized_event_dropped() {
        assert_eq!(
            InspectorEvent::from_message("Heap.garbageCollected", serde_json::json!({})),
            None
        );
    }

    #[test]
    fn protocol_remote_object_primitive() {
        let obj: RemoteObject =
            serde_json::from_str(r#"{"type": "number", "value": 42, "description": "42"}"#)
                .unwrap();
        assert_eq!(obj.object_type, "number");
        assert_eq!(obj.value, Some(serde_json::json!(42)));
        assert!(obj.object_id.is_none());
    }

    #[test]
    fn protocol_property_descriptor() {
        let prop: PropertyDescriptor = serde_json::from_str(
            r#"{"name": "items", "value": {"type": "object", "subtype": "array", "objectId": "obj:9", "description": "Array(3)"}}"#,
        )
        .unwrap();
        assert_eq!(prop.name, "items");
        assert_eq!(prop.value.unwrap().object_id.as_deref(), Some("obj:9"));
    }
}
