//! Debug session state machine.
//!
//! One session per client connection. The session owns the breakpoint
//! state, the script registry, the cached call frames, the variable
//! reference table, and the handles to the inspector client and the
//! launched debuggee; it translates every DAP request into inspector
//! commands and every inspector event into DAP events.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::time::Duration;

use gantry_config::BridgeConfig;
use gantry_dap::protocol::{
    BreakpointInfo, ContinuedEventBody, EvaluateArguments, EvaluateResponseBody, LaunchArguments,
    OutputEventBody, Request, Scope, ScopesArguments, ScopesResponseBody,
    SetBreakpointsArguments, SetBreakpointsResponseBody, Source, StackFrame,
    StackTraceResponseBody, StopReason, StoppedEventBody, TerminatedEventBody, Thread,
    ThreadsResponseBody, Variable, VariablesArguments, VariablesResponseBody,
};
use gantry_dap::{adapter_capabilities, DapCommand};
use gantry_inspector::{
    CallFrame, ConsoleMessage, InspectorClient, InspectorError, InspectorEvent,
    PropertyDescriptor, RemoteObject, ScopeEntry, ScriptRecord,
};
use gantry_launcher::{launch, LaunchEvent, LaunchSpec, LaunchedProcess, Sandbox};

use crate::breakpoints::BreakpointStore;
use crate::launch::{
    breakpoint_line_for, is_preamble_line, materialize, user_line_for, MaterializedProgram,
    RESULT_SENTINEL,
};
use crate::varref::{VarTarget, VariableRefTable};

/// The single thread id the bridge reports.
const THREAD_ID: i64 = 1;

/// Lifecycle phase of a debug session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Session created, nothing negotiated.
    Idle,
    /// Capabilities negotiated.
    Initialized,
    /// Client finished sending configuration.
    Configured,
    /// Launch accepted; materializing and spawning.
    Launching,
    /// Debuggee spawned; waiting for its inspector endpoint.
    AwaitingInspector,
    /// Inspector connected; enabling domains and arming breakpoints.
    Handshaking,
    /// Debuggee executing.
    Running,
    /// Debuggee paused.
    Paused,
    /// Session over; resources released.
    Terminated,
}

/// An event delivered to the session by one of its collaborators.
#[derive(Debug)]
pub enum SessionEvent {
    /// From the inspector connection.
    Inspector(InspectorEvent),
    /// From the process launcher.
    Launcher(LaunchEvent),
}

/// The per-connection debug session.
pub struct DebugSession {
    phase: Phase,
    seq: i64,
    config: BridgeConfig,
    /// Encoded DAP frames headed for the client.
    outbox: mpsc::UnboundedSender<String>,
    /// Where the launcher and inspector forwarders deliver their events.
    events_tx: mpsc::UnboundedSender<SessionEvent>,

    inspector: Option<InspectorClient>,
    process: Option<LaunchedProcess>,
    program: Option<MaterializedProgram>,
    script_path: Option<PathBuf>,

    breakpoints: BreakpointStore,
    scripts: HashMap<String, ScriptRecord>,
    main_script_id: Option<String>,
    call_frames: Vec<CallFrame>,
    var_refs: VariableRefTable,

    initial_pause_handled: bool,
    terminated_sent: bool,
    /// A resume/step is in flight; console output is held back until the
    /// next stop so it never races ahead of the `stopped` event.
    stepping: bool,
    buffered_output: Vec<OutputEventBody>,
    script_result: Option<serde_json::Value>,
}

impl DebugSession {
    /// Create a session for one client connection.
    pub fn new(
        config: BridgeConfig,
        outbox: mpsc::UnboundedSender<String>,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            seq: 1,
            config,
            outbox,
            events_tx,
            inspector: None,
            process: None,
            program: None,
            script_path: None,
            breakpoints: BreakpointStore::new(),
            scripts: HashMap::new(),
            main_script_id: None,
            call_frames: Vec::new(),
            var_refs: VariableRefTable::new(),
            initial_pause_handled: false,
            terminated_sent: false,
            stepping: false,
            buffered_output: Vec::new(),
            script_result: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    // -----------------------------------------------------------------
    // Outbound plumbing
    // -----------------------------------------------------------------

    fn next_seq(&mut self) -> i64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn send_frame<T: serde::Serialize>(&mut self, message: &T) {
        match gantry_dap::encode_message(message) {
            Ok(text) => {
                // A send failure means the client is gone; the server
                // loop tears the session down right after.
                let _ = self.outbox.send(text);
            }
            Err(e) => tracing::error!("failed to encode outgoing frame: {e}"),
        }
    }

    fn respond(
        &mut self,
        request: &Request,
        success: bool,
        body: Option<serde_json::Value>,
        message: Option<String>,
    ) {
        let response = gantry_dap::protocol::Response {
            seq: self.next_seq(),
            message_type: "response".into(),
            request_seq: request.seq,
            success,
            command: request.command.clone(),
            message,
            body,
        };
        self.send_frame(&response);
    }

    fn respond_ok<T: serde::Serialize>(&mut self, request: &Request, body: &T) {
        let body = serde_json::to_value(body).ok();
        self.respond(request, true, body, None);
    }

    fn respond_err(&mut self, request: &Request, message: impl Into<String>) {
        self.respond(request, false, None, Some(message.into()));
    }

    fn emit<T: serde::Serialize>(&mut self, event: &str, body: Option<&T>) {
        let event = gantry_dap::protocol::Event {
            seq: self.next_seq(),
            message_type: "event".into(),
            event: event.into(),
            body: body.and_then(|b| serde_json::to_value(b).ok()),
        };
        self.send_frame(&event);
    }

    fn emit_output(&mut self, body: OutputEventBody) {
        if self.stepping {
            self.buffered_output.push(body);
        } else {
            self.emit("output", Some(&body));
        }
    }

    fn flush_buffered_output(&mut self) {
        self.stepping = false;
        for body in std::mem::take(&mut self.buffered_output) {
            self.emit("output", Some(&body));
        }
    }

    fn emit_terminated(&mut self) {
        let body = TerminatedEventBody {
            result: self.script_result.clone(),
        };
        self.emit("terminated", Some(&body));
    }

    // -----------------------------------------------------------------
    // Client frames
    // -----------------------------------------------------------------

    /// Handle one text frame from the client WebSocket.
    pub async fn handle_frame(&mut self, text: &str) {
        let request = match gantry_dap::decode_request(text) {
            Ok(Some(request)) => request,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("dropping malformed client frame: {e}");
                return;
            }
        };

        let command = match DapCommand::parse(&request) {
            Ok(command) => command,
            Err(e) => {
                self.respond_err(&request, e.to_string());
                return;
            }
        };

        tracing::debug!("handling {} (seq {})", request.command, request.seq);
        match command {
            DapCommand::Initialize => self.handle_initialize(&request),
            DapCommand::SetBreakpoints(args) => self.handle_set_breakpoints(&request, args).await,
            DapCommand::ConfigurationDone => self.handle_configuration_done(&request),
            DapCommand::Launch(args) => self.handle_launch(&request, args).await,
            DapCommand::Threads => self.handle_threads(&request),
            DapCommand::StackTrace => self.handle_stack_trace(&request),
            DapCommand::Scopes(args) => self.handle_scopes(&request, args),
            DapCommand::Variables(args) => self.handle_variables(&request, args).await,
            DapCommand::Evaluate(args) => self.handle_evaluate(&request, args).await,
            DapCommand::Continue => self.handle_resume(&request, "Debugger.resume", true).await,
            DapCommand::Next => self.handle_resume(&request, "Debugger.stepOver", false).await,
            DapCommand::StepIn => self.handle_resume(&request, "Debugger.stepInto", false).await,
            DapCommand::StepOut => self.handle_resume(&request, "Debugger.stepOut", false).await,
            DapCommand::Pause => self.handle_pause(&request).await,
            DapCommand::Disconnect => self.handle_disconnect(&request),
            DapCommand::Terminate => self.handle_terminate(&request),
        }
    }

    fn handle_initialize(&mut self, request: &Request) {
        self.respond_ok(request, &adapter_capabilities());
        if self.phase == Phase::Idle {
            self.phase = Phase::Initialized;
        }
        self.emit::<()>("initialized", None);
    }

    fn handle_configuration_done(&mut self, request: &Request) {
        if self.phase == Phase::Initialized {
            self.phase = Phase::Configured;
        }
        self.respond(request, true, None, None);
    }

    async fn handle_set_breakpoints(&mut self, request: &Request, args: SetBreakpointsArguments) {
        let path = args.source.path.clone().unwrap_or_default();
        let lines: Vec<i64> = args
            .breakpoints
            .unwrap_or_default()
            .into_iter()
            .map(|bp| bp.line)
            .collect();
        self.breakpoints.set_lines(&path, &lines);
        tracing::debug!("stored breakpoints for {path}: {lines:?}");

        // If the debuggee is already attached, rearm immediately.
        if self.inspector.is_some() {
            self.apply_breakpoints().await;
        }

        // Every requested breakpoint is reported verified; line validity
        // is not probed against the script bounds.
        let breakpoints: Vec<BreakpointInfo> = self
            .breakpoints
            .lines_for(&path)
            .iter()
            .enumerate()
            .map(|(index, &line)| BreakpointInfo {
                id: Some(index as i64 + 1),
                verified: true,
                line: Some(line),
                source: Some(args.source.clone()),
            })
            .collect();
        self.respond_ok(request, &SetBreakpointsResponseBody { breakpoints });
    }

    async fn handle_launch(&mut self, request: &Request, args: LaunchArguments) {
        if !matches!(self.phase, Phase::Initialized | Phase::Configured) {
            self.respond_err(
                request,
                format!("launch is not valid in the {:?} phase", self.phase),
            );
            return;
        }

        let source = match (&args.program, &args.code) {
            (None, None) => {
                self.respond_err(request, "no program or code specified");
                return;
            }
            (Some(_), Some(_)) => {
                self.respond_err(request, "supply either program or code, not both");
                return;
            }
            (Some(program), None) => match std::fs::read_to_string(program) {
                Ok(text) => text,
                Err(e) => {
                    self.respond_err(request, format!("failed to read {program}: {e}"));
                    return;
                }
            },
            (None, Some(code)) => code.clone(),
        };

        let call_main_args = args
            .call_main
            .unwrap_or(false)
            .then(|| args.args.clone().unwrap_or_default());
        let program = match materialize(&source, call_main_args.as_ref()) {
            Ok(program) => program,
            Err(e) => {
                self.respond_err(request, format!("failed to write debug script: {e}"));
                return;
            }
        };
        self.script_path = Some(program.path.clone());
        self.program = Some(program);
        self.phase = Phase::Launching;

        // The response goes out before the debuggee exists; launcher and
        // handshake failures are reported through events below.
        self.respond(request, true, None, None);

        if let Err(e) = self.run_launch_pipeline(&args).await {
            tracing::warn!("launch failed: {e:#}");
            self.emit_output(OutputEventBody {
                category: "stderr".into(),
                output: format!("Failed to launch debuggee: {e}\n"),
                source: None,
                line: None,
            });
            if !self.terminated_sent {
                self.terminated_sent = true;
                self.emit_terminated();
            }
            self.cleanup();
        }
    }

    /// Spawn the debuggee, connect to its inspector, and run the
    /// handshake. Any error aborts the launch.
    async fn run_launch_pipeline(&mut self, args: &LaunchArguments) -> anyhow::Result<()> {
        let Some(script_path) = self.script_path.clone() else {
            anyhow::bail!("no materialized script");
        };
        let cwd = args
            .cwd
            .clone()
            .map(PathBuf::from)
            .or_else(|| script_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let mut spec = LaunchSpec::new(self.config.runtime.command.clone(), script_path, cwd);
        spec.url_timeout = Duration::from_secs(self.config.runtime.launch_timeout_secs);
        spec.env = self.config.runtime.env.clone();
        if let Some(env) = &args.env {
            spec.env.extend(env.clone());
        }
        if self.config.sandbox.enabled {
            spec.sandbox = Some(Sandbox {
                command: self
                    .config
                    .sandbox
                    .command
                    .clone()
                    .unwrap_or_default(),
                config_path: self.config.sandbox.config_path.clone(),
                extra_args: self.config.sandbox.extra_args.clone(),
            });
        }

        self.phase = Phase::AwaitingInspector;
        let (launch_tx, mut launch_rx) = mpsc::unbounded_channel::<LaunchEvent>();
        let forward = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = launch_rx.recv().await {
                if forward.send(SessionEvent::Launcher(event)).is_err() {
                    break;
                }
            }
        });
        let (process, url) = launch(spec, launch_tx).await?;
        self.process = Some(process);

        self.phase = Phase::Handshaking;
        let (inspector_tx, mut inspector_rx) = mpsc::unbounded_channel::<InspectorEvent>();
        let forward = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = inspector_rx.recv().await {
                if forward.send(SessionEvent::Inspector(event)).is_err() {
                    break;
                }
            }
        });
        let mut inspector = InspectorClient::connect(&url, inspector_tx).await?;
        inspector
            .set_request_timeout(Duration::from_secs(self.config.runtime.request_timeout_secs));
        self.inspector = Some(inspector.clone());

        // Handshake: enable the domains, arm pausing, set breakpoints,
        // then release the debuggee. Each step blocks; the first failure
        // aborts the launch.
        for (method, params) in [
            ("Inspector.enable", serde_json::json!({})),
            ("Console.enable", serde_json::json!({})),
            ("Debugger.enable", serde_json::json!({})),
            ("Runtime.enable", serde_json::json!({})),
            (
                "Debugger.setBreakpointsActive",
                serde_json::json!({"active": true}),
            ),
            (
                "Debugger.setPauseOnDebuggerStatements",
                serde_json::json!({"enabled": true}),
            ),
            (
                "Debugger.setPauseOnExceptions",
                serde_json::json!({"state": "uncaught"}),
            ),
        ] {
            inspector.send(method, params).await?;
        }

        self.apply_breakpoints().await;

        inspector
            .send("Inspector.initialized", serde_json::json!({}))
            .await?;
        self.phase = Phase::Running;
        tracing::info!("debuggee running");
        Ok(())
    }

    /// Clear every inspector breakpoint recorded so far, then recreate
    /// one per stored line, keyed by a URL pattern anchored to the
    /// debuggee script (the script may not be parsed yet).
    async fn apply_breakpoints(&mut self) {
        let Some(inspector) = self.inspector.clone() else {
            return;
        };
        let Some(script_path) = self.script_path.clone() else {
            return;
        };

        for id in self.breakpoints.take_inspector_ids() {
            // The breakpoint may already be gone if the script reloaded.
            if let Err(e) = inspector
                .send(
                    "Debugger.removeBreakpoint",
                    serde_json::json!({"breakpointId": id}),
                )
                .await
            {
                tracing::debug!("removing stale breakpoint failed: {e}");
            }
        }

        let url_regex = regex::escape(&script_path.to_string_lossy());
        for (path, lines) in self.breakpoints.entries() {
            let mut ids = Vec::new();
            for line in lines {
                let line_number = breakpoint_line_for(line);
                match inspector
                    .send(
                        "Debugger.setBreakpointByUrl",
                        serde_json::json!({
                            "lineNumber": line_number,
                            "urlRegex": url_regex,
                            "columnNumber": 0,
                        }),
                    )
                    .await
                {
                    Ok(result) => {
                        if let Some(id) = result.get("breakpointId").and_then(|v| v.as_str()) {
                            ids.push(id.to_string());
                        } else {
                            tracing::warn!("no breakpointId for line {line}");
                        }
                    }
                    Err(e) => tracing::warn!("failed to set breakpoint at line {line}: {e}"),
                }
            }
            self.breakpoints.record_inspector_ids(&path, ids);
        }
        tracing::debug!(
            "breakpoints armed: {} inspector ids live",
            self.breakpoints.inspector_id_count()
        );
    }

    fn handle_threads(&mut self, request: &Request) {
        self.respond_ok(
            request,
            &ThreadsResponseBody {
                threads: vec![Thread {
                    id: THREAD_ID,
                    name: "main".into(),
                }],
            },
        );
    }

    fn handle_stack_trace(&mut self, request: &Request) {
        let mut stack_frames = Vec::new();
        let mut previous: Option<(&str, i64)> = None;
        for (index, frame) in self.call_frames.iter().enumerate() {
            let anonymous = frame.function_name.is_empty();
            // Drop runs of anonymous frames that repeat the location of
            // the frame above them.
            if let Some((script_id, line)) = previous {
                if anonymous
                    && script_id == frame.location.script_id
                    && line == frame.location.line_number
                {
                    continue;
                }
            }
            previous = Some((frame.location.script_id.as_str(), frame.location.line_number));

            let name = if !anonymous {
                frame.function_name.clone()
            } else if self.main_script_id.as_deref() == Some(frame.location.script_id.as_str()) {
                "<module>".to_string()
            } else {
                "<anonymous>".to_string()
            };
            let path = self
                .scripts
                .get(&frame.location.script_id)
                .map(|script| script.url.clone())
                .filter(|url| !url.is_empty())
                .or_else(|| {
                    self.script_path
                        .as_ref()
                        .map(|p| p.to_string_lossy().into_owned())
                });
            let source = path.map(|path| Source {
                name: Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned()),
                path: Some(path),
            });

            stack_frames.push(StackFrame {
                // Ids stay aligned with the unfiltered frame cache so
                // scopes/evaluate resolve against the right frame.
                id: index as i64 + 1,
                name,
                source,
                line: user_line_for(frame.location.line_number),
                column: frame.location.column_number + 1,
            });
        }

        let total_frames = stack_frames.len() as i64;
        self.respond_ok(
            request,
            &StackTraceResponseBody {
                stack_frames,
                total_frames,
            },
        );
    }

    fn handle_scopes(&mut self, request: &Request, args: ScopesArguments) {
        let frame_index = (args.frame_id - 1).max(0) as usize;
        let Some(frame) = self.call_frames.get(frame_index) else {
            self.respond_ok(request, &ScopesResponseBody { scopes: Vec::new() });
            return;
        };

        // The global scope is omitted to bound payload size.
        let chain: Vec<ScopeEntry> = frame
            .scope_chain
            .iter()
            .filter(|entry| entry.scope_type != "global")
            .cloned()
            .collect();

        let mut scopes = Vec::new();
        for entry in chain {
            let Some(object_id) = entry.object.object_id.clone() else {
                continue;
            };
            let reference = self.var_refs.allocate_scope(object_id, frame_index);
            scopes.push(Scope {
                name: scope_display_name(&entry),
                variables_reference: reference,
                expensive: false,
            });
        }
        tracing::debug!(
            "scopes for frame {}: {} ({} refs live)",
            args.frame_id,
            scopes.len(),
            self.var_refs.len()
        );
        self.respond_ok(request, &ScopesResponseBody { scopes });
    }

    async fn handle_variables(&mut self, request: &Request, args: VariablesArguments) {
        let empty = VariablesResponseBody {
            variables: Vec::new(),
        };
        let object_id = match self.var_refs.get(args.variables_reference) {
            Some(VarTarget::Scope {
                object_id,
                frame_index,
            }) => {
                tracing::debug!("expanding scope of frame {frame_index}");
                Some(object_id.clone())
            }
            Some(VarTarget::Object { object_id }) => Some(object_id.clone()),
            None => None,
        };
        let Some(object_id) = object_id else {
            self.respond_ok(request, &empty);
            return;
        };
        let Some(inspector) = self.inspector.clone() else {
            self.respond_ok(request, &empty);
            return;
        };

        let result = inspector
            .send(
                "Runtime.getProperties",
                serde_json::json!({
                    "objectId": object_id,
                    "ownProperties": true,
                    "generatePreview": true,
                }),
            )
            .await;
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("getProperties failed: {e}");
                self.respond_ok(request, &empty);
                return;
            }
        };

        let properties: Vec<PropertyDescriptor> = result
            .get("properties")
            .cloned()
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        let mut variables = Vec::new();
        for property in properties {
            let Some(value) = property.value else {
                continue;
            };
            // Runtime-internal plumbing is not a user variable.
            if property.name.starts_with("__") {
                continue;
            }
            // Children are materialized lazily: a reference is handed out
            // now, the properties are only fetched when asked for.
            let reference = match &value.object_id {
                Some(object_id) if value.object_type == "object" => {
                    self.var_refs.allocate_object(object_id.clone())
                }
                _ => 0,
            };
            variables.push(Variable {
                name: property.name,
                value: render_value(&value),
                variable_type: (!value.object_type.is_empty()).then(|| value.object_type.clone()),
                variables_reference: reference,
            });
        }
        self.respond_ok(request, &VariablesResponseBody { variables });
    }

    async fn handle_evaluate(&mut self, request: &Request, args: EvaluateArguments) {
        let frame = args
            .frame_id
            .and_then(|id| usize::try_from(id - 1).ok())
            .and_then(|index| self.call_frames.get(index));

        let result = match (self.inspector.clone(), frame) {
            (Some(inspector), Some(frame)) => {
                inspector
                    .send(
                        "Debugger.evaluateOnCallFrame",
                        serde_json::json!({
                            "callFrameId": frame.call_frame_id,
                            "expression": args.expression,
                            "returnByValue": false,
                            "generatePreview": true,
                        }),
                    )
                    .await
            }
            (Some(inspector), None) => {
                inspector
                    .send(
                        "Runtime.evaluate",
                        serde_json::json!({
                            "expression": args.expression,
                            "returnByValue": false,
                            "generatePreview": true,
                        }),
                    )
                    .await
            }
            (None, _) => Err(InspectorError::Closed),
        };

        // Evaluation failures render as a successful response carrying
        // the error text; editors treat watch/hover errors as values.
        let body = match result {
            Ok(result) => {
                let object: RemoteObject = result
                    .get("result")
                    .cloned()
                    .and_then(|r| serde_json::from_value(r).ok())
                    .unwrap_or_default();
                let variables_reference = match &object.object_id {
                    Some(object_id) => self.var_refs.allocate_object(object_id.clone()),
                    None => 0,
                };
                EvaluateResponseBody {
                    result: render_value(&object),
                    variables_reference,
                }
            }
            Err(e) => EvaluateResponseBody {
                result: format!("Error: {e}"),
                variables_reference: 0,
            },
        };
        self.respond_ok(request, &body);
    }

    async fn handle_resume(&mut self, request: &Request, method: &str, is_continue: bool) {
        let Some(inspector) = self.inspector.clone() else {
            self.respond_err(request, "no debuggee attached");
            return;
        };
        self.stepping = true;
        match inspector.send(method, serde_json::json!({})).await {
            Ok(_) => {
                if is_continue {
                    self.respond(
                        request,
                        true,
                        Some(serde_json::json!({"allThreadsContinued": true})),
                        None,
                    );
                } else {
                    self.respond(request, true, None, None);
                }
            }
            Err(e) => {
                self.stepping = false;
                self.respond_err(request, e.to_string());
            }
        }
    }

    async fn handle_pause(&mut self, request: &Request) {
        let Some(inspector) = self.inspector.clone() else {
            self.respond_err(request, "no debuggee attached");
            return;
        };
        match inspector.send("Debugger.pause", serde_json::json!({})).await {
            Ok(_) => self.respond(request, true, None, None),
            Err(e) => self.respond_err(request, e.to_string()),
        }
    }

    fn handle_disconnect(&mut self, request: &Request) {
        self.cleanup();
        self.respond(request, true, None, None);
    }

    fn handle_terminate(&mut self, request: &Request) {
        let should_emit = !self.terminated_sent;
        self.terminated_sent = true;
        self.cleanup();
        self.respond(request, true, None, None);
        if should_emit {
            self.emit_terminated();
        }
    }

    // -----------------------------------------------------------------
    // Collaborator events
    // -----------------------------------------------------------------

    /// Handle one event from the inspector or the launcher.
    pub async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Inspector(InspectorEvent::ScriptParsed(record)) => {
                self.handle_script_parsed(record);
            }
            SessionEvent::Inspector(InspectorEvent::Paused {
                reason,
                call_frames,
            }) => {
                self.handle_paused(&reason, call_frames).await;
            }
            SessionEvent::Inspector(InspectorEvent::Resumed) => {
                if self.phase == Phase::Paused {
                    self.phase = Phase::Running;
                }
                self.emit(
                    "continued",
                    Some(&ContinuedEventBody {
                        thread_id: THREAD_ID,
                        all_threads_continued: true,
                    }),
                );
            }
            SessionEvent::Inspector(InspectorEvent::Console(message)) => {
                self.handle_console(message);
            }
            SessionEvent::Inspector(InspectorEvent::ExceptionThrown { text }) => {
                self.emit_output(OutputEventBody {
                    category: "stderr".into(),
                    output: format!("Exception: {text}\n"),
                    source: None,
                    line: None,
                });
            }
            SessionEvent::Inspector(InspectorEvent::BreakpointResolved { breakpoint_id }) => {
                tracing::debug!("breakpoint resolved: {breakpoint_id}");
            }
            SessionEvent::Inspector(InspectorEvent::Closed)
            | SessionEvent::Launcher(LaunchEvent::Exited(_)) => {
                self.handle_debuggee_gone();
            }
            SessionEvent::Launcher(LaunchEvent::Stderr(line)) => {
                self.emit_output(OutputEventBody {
                    category: "stderr".into(),
                    output: format!("{line}\n"),
                    source: None,
                    line: None,
                });
            }
        }
    }

    fn handle_script_parsed(&mut self, record: ScriptRecord) {
        if let Some(file_name) = self
            .script_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            if !record.url.is_empty() && record.url.ends_with(file_name) {
                tracing::debug!("main script parsed: {} ({})", record.url, record.script_id);
                self.main_script_id = Some(record.script_id.clone());
            }
        }
        self.scripts.insert(record.script_id.clone(), record);
    }

    /// The pause algorithm.
    ///
    /// The very first pause of a session is the injected preamble's
    /// debugger statement: the script is parsed by now, so breakpoints
    /// are re-armed against real locations, execution resumes, and the
    /// client never hears about it. Every later pause is forwarded.
    async fn handle_paused(&mut self, reason: &str, call_frames: Vec<CallFrame>) {
        self.call_frames = call_frames;
        let top_line = self
            .call_frames
            .first()
            .map(|frame| frame.location.line_number);

        let synthetic = !self.initial_pause_handled
            && reason == "DebuggerStatement"
            && top_line.is_some_and(is_preamble_line);
        self.initial_pause_handled = true;

        if synthetic {
            tracing::debug!("suppressing the injected initial pause");
            self.apply_breakpoints().await;
            if let Some(inspector) = self.inspector.clone() {
                if let Err(e) = inspector.send("Debugger.resume", serde_json::json!({})).await {
                    tracing::warn!("auto-resume after initial pause failed: {e}");
                }
            }
            return;
        }

        self.phase = Phase::Paused;
        self.emit(
            "stopped",
            Some(&StoppedEventBody {
                reason: map_pause_reason(reason),
                thread_id: THREAD_ID,
                all_threads_stopped: true,
                line: top_line.map(user_line_for),
            }),
        );
        self.flush_buffered_output();
    }

    fn handle_console(&mut self, message: ConsoleMessage) {
        let text = render_console_text(&message);

        // The sentinel line carries the entry function's return value;
        // it is captured, never forwarded.
        if let Some(payload) = text.strip_prefix(RESULT_SENTINEL) {
            match serde_json::from_str(payload.trim()) {
                Ok(value) => {
                    tracing::debug!("captured script result");
                    self.script_result = Some(value);
                    self.flush_buffered_output();
                    if !self.terminated_sent {
                        self.terminated_sent = true;
                        self.emit_terminated();
                    }
                }
                Err(e) => tracing::warn!("unparseable result payload: {e}"),
            }
            return;
        }

        let category = match message.level.as_str() {
            "error" | "warning" => "stderr",
            _ => "stdout",
        };
        let source = message.url.as_ref().map(|url| Source {
            name: Path::new(url)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            path: Some(url.clone()),
        });
        self.emit_output(OutputEventBody {
            category: category.into(),
            output: format!("{text}\n"),
            source,
            line: message.line.map(user_line_for),
        });
    }

    /// Debuggee exit and inspector-socket loss land here, on the same
    /// path as explicit termination.
    fn handle_debuggee_gone(&mut self) {
        if !self.terminated_sent {
            self.terminated_sent = true;
            self.flush_buffered_output();
            self.emit_terminated();
        }
        self.cleanup();
    }

    // -----------------------------------------------------------------
    // Cleanup
    // -----------------------------------------------------------------

    /// Release everything the session may hold. Idempotent, and safe
    /// when some resources were never acquired (e.g. launch failed
    /// before a process existed).
    pub fn cleanup(&mut self) {
        // Dropping the client closes the inspector socket.
        self.inspector = None;
        if let Some(mut process) = self.process.take() {
            process.kill();
        }
        // Dropping the materialized program removes the temp dir.
        self.program = None;
        self.phase = Phase::Terminated;
    }

    #[cfg(test)]
    fn set_stepping(&mut self, stepping: bool) {
        self.stepping = stepping;
    }
}

/// Map an inspector pause reason onto a DAP stop reason.
///
/// A debugger statement in user code reads as a breakpoint to the
/// client; anything unrecognized reads as a step.
fn map_pause_reason(reason: &str) -> StopReason {
    match reason {
        "Breakpoint" | "breakpoint" => StopReason::Breakpoint,
        "DebuggerStatement" => StopReason::Breakpoint,
        "step" => StopReason::Step,
        "exception" => StopReason::Exception,
        "debugCommand" => StopReason::Pause,
        _ => StopReason::Step,
    }
}

/// Display name for a scope: its own name when present, otherwise the
/// capitalized scope type.
fn scope_display_name(entry: &ScopeEntry) -> String {
    if let Some(name) = &entry.name {
        return name.clone();
    }
    let mut chars = entry.scope_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Scope".to_string(),
    }
}

/// Render a runtime value for display: primitives as their JSON literal,
/// objects by their description.
fn render_value(object: &RemoteObject) -> String {
    if object.object_type == "undefined" {
        return "undefined".into();
    }
    if object.subtype.as_deref() == Some("null") {
        return "null".into();
    }
    if let Some(value) = &object.value {
        return value.to_string();
    }
    if let Some(description) = &object.description {
        return description.clone();
    }
    object.object_type.clone()
}

/// Render a console message: joined structured arguments when present,
/// the pre-rendered text otherwise. Strings print bare, unlike in
/// variable rendering.
fn render_console_text(message: &ConsoleMessage) -> String {
    match &message.parameters {
        Some(parameters) if !parameters.is_empty() => parameters
            .iter()
            .map(|p| match &p.value {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None if p.object_type == "undefined" => "undefined".into(),
                None => p.description.clone().unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join(" "),
        _ => message.text.clone(),
    }
}
