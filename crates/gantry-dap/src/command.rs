//! Closed command dispatch for incoming DAP requests.
//!
//! Requests carry a free-form command string on the wire; parsing it into
//! a closed enum keeps the dispatch exhaustive, so adding a command to the
//! supported set forces every match site to handle it.

use crate::error::DapError;
use crate::protocol::{
    EvaluateArguments, LaunchArguments, Request, ScopesArguments, SetBreakpointsArguments,
    VariablesArguments,
};

/// A parsed DAP command with its decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum DapCommand {
    /// Capability negotiation.
    Initialize,
    /// Replace the breakpoints of one source.
    SetBreakpoints(SetBreakpointsArguments),
    /// Client finished sending configuration.
    ConfigurationDone,
    /// Start the debuggee.
    Launch(LaunchArguments),
    /// List debuggee threads.
    Threads,
    /// Report the current call stack.
    StackTrace,
    /// Report the scopes of one frame.
    Scopes(ScopesArguments),
    /// Report the children of a variables reference.
    Variables(VariablesArguments),
    /// Evaluate an expression.
    Evaluate(EvaluateArguments),
    /// Resume execution.
    Continue,
    /// Step over.
    Next,
    /// Step into.
    StepIn,
    /// Step out.
    StepOut,
    /// Interrupt execution.
    Pause,
    /// Detach from the session.
    Disconnect,
    /// Terminate the debuggee.
    Terminate,
}

impl DapCommand {
    /// Parse a request into a command, decoding its arguments.
    ///
    /// Returns [`DapError::UnsupportedCommand`] for commands outside the
    /// supported set and [`DapError::InvalidArguments`] when the arguments
    /// do not decode.
    pub fn parse(request: &Request) -> Result<Self, DapError> {
        fn args<T: serde::de::DeserializeOwned>(request: &Request) -> Result<T, DapError> {
            let value = request
                .arguments
                .clone()
                .unwrap_or(serde_json::Value::Object(Default::default()));
            serde_json::from_value(value).map_err(|e| DapError::InvalidArguments {
                command: request.command.clone(),
                message: e.to_string(),
            })
        }

        match request.command.as_str() {
            "initialize" => Ok(Self::Initialize),
            "setBreakpoints" => Ok(Self::SetBreakpoints(args(request)?)),
            "configurationDone" => Ok(Self::ConfigurationDone),
            "launch" => Ok(Self::Launch(args(request)?)),
            "threads" => Ok(Self::Threads),
            "stackTrace" => Ok(Self::StackTrace),
            "scopes" => Ok(Self::Scopes(args(request)?)),
            "variables" => Ok(Self::Variables(args(request)?)),
            "evaluate" => Ok(Self::Evaluate(args(request)?)),
            "continue" => Ok(Self::Continue),
            "next" => Ok(Self::Next),
            "stepIn" => Ok(Self::StepIn),
            "stepOut" => Ok(Self::StepOut),
            "pause" => Ok(Self::Pause),
            "disconnect" => Ok(Self::Disconnect),
            "terminate" => Ok(Self::Terminate),
            other => Err(DapError::UnsupportedCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: &str, arguments: Option<serde_json::Value>) -> Request {
        Request {
            seq: 1,
            message_type: "request".into(),
            command: command.into(),
            arguments,
        }
    }

    #[test]
    fn command_parse_initialize() {
        let cmd = DapCommand::parse(&request("initialize", None)).unwrap();
        assert_eq!(cmd, DapCommand::Initialize);
    }

    #[test]
    fn command_parse_launch_with_code() {
        let cmd = DapCommand::parse(&request(
            "launch",
            Some(serde_json::json!({"code": "let x = 1;\n", "callMain": false})),
        ))
        .unwrap();
        match cmd {
            DapCommand::Launch(args) => {
                assert_eq!(args.code.as_deref(), Some("let x = 1;\n"));
                assert_eq!(args.call_main, Some(false));
            }
            other => panic!("expected Launch, got {other:?}"),
        }
    }

    #[test]
    fn command_parse_set_breakpoints() {
        let cmd = DapCommand::parse(&request(
            "setBreakpoints",
            Some(serde_json::json!({
                "source": {"path": "/tmp/s.ts"},
                "breakpoints": [{"line": 2}]
            })),
        ))
        .unwrap();
        match cmd {
            DapCommand::SetBreakpoints(args) => {
                assert_eq!(args.breakpoints.unwrap()[0].line, 2);
            }
            other => panic!("expected SetBreakpoints, got {other:?}"),
        }
    }

    #[test]
    fn command_parse_set_breakpoints_missing_source() {
        let err = DapCommand::parse(&request("setBreakpoints", None)).unwrap_err();
        assert!(matches!(err, DapError::InvalidArguments { .. }));
    }

    #[test]
    fn command_parse_stepping_commands() {
        for (name, expected) in [
            ("continue", DapCommand::Continue),
            ("next", DapCommand::Next),
            ("stepIn", DapCommand::StepIn),
            ("stepOut", DapCommand::StepOut),
            ("pause", DapCommand::Pause),
        ] {
            assert_eq!(DapCommand::parse(&request(name, None)).unwrap(), expected);
        }
    }

    #[test]
    fn command_parse_unsupported() {
        let err = DapCommand::parse(&request("restartFrame", None)).unwrap_err();
        match err {
            DapError::UnsupportedCommand(name) => assert_eq!(name, "restartFrame"),
            other => panic!("expected UnsupportedCommand, got {other:?}"),
        }
    }

    #[test]
    fn command_parse_scopes_and_variables() {
        let cmd = DapCommand::parse(&request("scopes", Some(serde_json::json!({"frameId": 1}))))
            .unwrap();
        assert_eq!(
            cmd,
            DapCommand::Scopes(ScopesArguments { frame_id: 1 })
        );

        let cmd = DapCommand::parse(&request(
            "variables",
            Some(serde_json::json!({"variablesReference": 7})),
        ))
        .unwrap();
        assert_eq!(
            cmd,
            DapCommand::Variables(VariablesArguments {
                variables_reference: 7
            })
        );
    }

    #[test]
    fn command_parse_evaluate_without_frame() {
        let cmd = DapCommand::parse(&request(
            "evaluate",
            Some(serde_json::json!({"expression": "1/0"})),
        ))
        .unwrap();
        match cmd {
            DapCommand::Evaluate(args) => {
                assert_eq!(args.expression, "1/0");
                assert_eq!(args.frame_id, None);
            }
            other => panic!("expected Evaluate, got {other:?}"),
        }
    }
}
