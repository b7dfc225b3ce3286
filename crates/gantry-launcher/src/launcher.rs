//! Debuggee process launcher.
//!
//! Starts the runtime in wait-for-debugger mode on an ephemeral local
//! port, discovers the inspector WebSocket URL from the runtime's stderr
//! banner, forwards the remaining stderr lines, and watches for exit.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};

use crate::error::LaunchError;

/// Base of the ephemeral inspector port range.
const INSPECT_PORT_BASE: u16 = 9229;

/// Width of the ephemeral inspector port range.
const INSPECT_PORT_SPREAD: u16 = 1000;

/// Default time allowed for the inspector URL to appear on stderr.
const URL_TIMEOUT: Duration = Duration::from_secs(10);

/// Sandbox supervisor wrapping for the debuggee command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    /// Supervisor binary (e.g. an nsjail-style wrapper).
    pub command: String,
    /// Supervisor configuration file, passed via `--config`.
    pub config_path: Option<PathBuf>,
    /// Extra supervisor arguments, verbatim.
    pub extra_args: Vec<String>,
}

/// Everything needed to start one debuggee.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Runtime binary (e.g. `bun`).
    pub runtime: String,
    /// Script the runtime should execute.
    pub script_path: PathBuf,
    /// Working directory for the debuggee.
    pub cwd: PathBuf,
    /// Environment for the debuggee, on top of the minimal base.
    pub env: HashMap<String, String>,
    /// Optional sandbox supervisor wrapping.
    pub sandbox: Option<Sandbox>,
    /// Bound on waiting for the inspector URL.
    pub url_timeout: Duration,
}

impl LaunchSpec {
    /// Create a spec with the default URL timeout and empty environment.
    pub fn new(
        runtime: impl Into<String>,
        script_path: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime: runtime.into(),
            script_path: script_path.into(),
            cwd: cwd.into(),
            env: HashMap::new(),
            sandbox: None,
            url_timeout: URL_TIMEOUT,
        }
    }
}

/// Events reported by a launched debuggee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    /// A stderr line that is not part of the inspector banner.
    Stderr(String),
    /// The debuggee exited.
    Exited(Option<i32>),
}

/// A handle to a running debuggee, used for later termination.
///
/// Exit is always reported on the launch event channel, whether the
/// process ended on its own or was killed through this handle.
#[derive(Debug)]
pub struct LaunchedProcess {
    kill_tx: Option<oneshot::Sender<()>>,
}

impl LaunchedProcess {
    /// Kill the debuggee. Safe to call more than once.
    pub fn kill(&mut self) {
        if let Some(tx) = self.kill_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Build the full command line for a spec, nesting it under the sandbox
/// supervisor when one is configured.
fn build_command(spec: &LaunchSpec, inspect_addr: &str) -> (String, Vec<String>) {
    let runtime_args = vec![
        format!("--inspect-wait={inspect_addr}"),
        spec.script_path.to_string_lossy().into_owned(),
    ];

    match &spec.sandbox {
        None => (spec.runtime.clone(), runtime_args),
        Some(sandbox) => {
            let mut args = Vec::new();
            if let Some(config) = &sandbox.config_path {
                args.push("--config".to_string());
                args.push(config.to_string_lossy().into_owned());
            }
            args.extend(sandbox.extra_args.iter().cloned());
            args.push("--cwd".to_string());
            args.push(spec.cwd.to_string_lossy().into_owned());
            args.push("--".to_string());
            args.push(spec.runtime.clone());
            args.extend(runtime_args);
            (sandbox.command.clone(), args)
        }
    }
}

/// Whether a stderr line belongs to the runtime's inspector banner.
///
/// Banner lines are consumed for URL discovery and never forwarded to
/// the client.
fn is_banner_line(line: &str) -> bool {
    line.contains("ws://")
        || line.contains("Inspector")
        || line.contains("Listening:")
        || line.contains("debug.bun.sh")
}

/// Start the debuggee described by `spec`.
///
/// Returns a kill handle and the discovered inspector WebSocket URL.
/// Stderr lines and the eventual exit are delivered on `events_tx`.
pub async fn launch(
    spec: LaunchSpec,
    events_tx: mpsc::UnboundedSender<LaunchEvent>,
) -> Result<(LaunchedProcess, String), LaunchError> {
    let port = INSPECT_PORT_BASE + rand::random::<u16>() % INSPECT_PORT_SPREAD;
    let inspect_addr = format!("127.0.0.1:{port}");
    let (program, args) = build_command(&spec, &inspect_addr);
    tracing::info!("launching debuggee: {program} {args:?}");

    // The debuggee gets a minimal environment, not the bridge's: just
    // enough to run the runtime, plus whatever the client supplied.
    let mut env: HashMap<String, String> = HashMap::new();
    if let Ok(path) = std::env::var("PATH") {
        env.insert("PATH".into(), path);
    }
    if let Ok(home) = std::env::var("HOME") {
        env.insert("HOME".into(), home);
    }
    env.extend(spec.env.clone());

    let mut child = Command::new(&program)
        .args(&args)
        .current_dir(&spec.cwd)
        .env_clear()
        .envs(&env)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| LaunchError::Spawn(format!("{program}: {e}")))?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| LaunchError::Spawn("could not capture stderr".into()))?;

    // Stderr task: scan for the inspector URL, forward everything else.
    let (url_tx, url_rx) = oneshot::channel::<String>();
    let stderr_events = events_tx.clone();
    tokio::spawn(async move {
        let url_pattern =
            regex::Regex::new(r"ws://[0-9.]+:\d+/[A-Za-z0-9]+").expect("static pattern");
        let mut url_tx = Some(url_tx);
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(m) = url_pattern.find(&line) {
                if let Some(tx) = url_tx.take() {
                    let _ = tx.send(m.as_str().to_string());
                }
            }
            if is_banner_line(&line) {
                continue;
            }
            if stderr_events.send(LaunchEvent::Stderr(line)).is_err() {
                break;
            }
        }
    });

    // Exit watcher: owns the child, honors the kill handle.
    let (kill_tx, mut kill_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let status = tokio::select! {
            status = child.wait() => status.ok(),
            _ = &mut kill_rx => {
                let _ = child.start_kill();
                child.wait().await.ok()
            }
        };
        let code = status.and_then(|s| s.code());
        tracing::info!("debuggee exited with code {code:?}");
        let _ = events_tx.send(LaunchEvent::Exited(code));
    });

    let handle = LaunchedProcess {
        kill_tx: Some(kill_tx),
    };

    let url = match timeout(spec.url_timeout, url_rx).await {
        Ok(Ok(url)) => url,
        // Either the timer fired or the stderr task ended without a banner.
        Ok(Err(_)) | Err(_) => {
            let mut handle = handle;
            handle.kill();
            return Err(LaunchError::InspectorUrlTimeout);
        }
    };

    tracing::info!("discovered inspector url: {url}");
    Ok((handle, url))
}
