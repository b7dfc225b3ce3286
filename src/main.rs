//! gantry — a DAP-to-inspector debug bridge.
//!
//! Terminates Debug Adapter Protocol sessions over WebSocket, launches
//! debuggee processes under a wait-for-debugger runtime, and translates
//! between DAP and the runtime's native inspector protocol.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

mod breakpoints;
mod launch;
mod registry;
mod server;
mod session;
mod varref;

/// Command-line overrides for the config file.
#[derive(Debug, Default)]
struct CliArgs {
    host: Option<String>,
    port: Option<u16>,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--host" => {
                parsed.host = Some(iter.next().context("--host requires a value")?.clone());
            }
            "--port" => {
                let value = iter.next().context("--port requires a value")?;
                parsed.port = Some(value.parse().context("--port must be a port number")?);
            }
            "--config" => {
                parsed.config = Some(PathBuf::from(
                    iter.next().context("--config requires a value")?,
                ));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let config_path = args.config.unwrap_or_else(|| PathBuf::from("gantry.toml"));
    let mut config = gantry_config::load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    server::serve(config).await
}
