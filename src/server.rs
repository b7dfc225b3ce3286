//! WebSocket accept loop and per-connection session driving.
//!
//! Each accepted connection gets one [`DebugSession`] and one task. The
//! task multiplexes everything the session reacts to: client frames,
//! outbound frames headed for the client, and events from the inspector
//! connection and the process launcher. There is no parallelism within
//! a session; sessions run independently of each other.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use gantry_config::BridgeConfig;

use crate::registry::SessionRegistry;
use crate::session::{DebugSession, SessionEvent};

/// Bind and serve until the process is stopped.
pub async fn serve(config: BridgeConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on ws://{addr}");

    let registry = Arc::new(SessionRegistry::new());
    let config = Arc::new(config);

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        let registry = registry.clone();
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, registry, config).await {
                tracing::warn!("connection {peer} ended with error: {e:#}");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<SessionRegistry>,
    config: Arc<BridgeConfig>,
) -> anyhow::Result<()> {
    let socket = tokio_tungstenite::accept_async(stream)
        .await
        .context("websocket handshake failed")?;

    let id = registry.insert(peer.to_string());
    tracing::info!(
        "client connected: {peer} (session {id}, {} active)",
        registry.len()
    );

    let result = run_session(socket, &config).await;

    registry.remove(id);
    tracing::info!("client disconnected: {peer} (session {id})");
    result
}

/// Drive one session until its client goes away.
async fn run_session(
    socket: tokio_tungstenite::WebSocketStream<TcpStream>,
    config: &BridgeConfig,
) -> anyhow::Result<()> {
    let (mut sink, mut stream) = socket.split();
    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<String>();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let mut session = DebugSession::new(config.clone(), outbox_tx, events_tx);

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => session.handle_frame(&text).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("client socket error: {e}");
                    break;
                }
            },
            Some(text) = outbox_rx.recv() => {
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Some(event) = events_rx.recv() => session.handle_session_event(event).await,
        }
    }

    // Whatever ended the connection, release the debuggee and its state.
    tracing::debug!("session loop ended in the {:?} phase", session.phase());
    session.cleanup();
    Ok(())
}
