//! Inspector client managing the WebSocket connection to the debuggee.
//!
//! Handles connect, command send with response correlation, and routing
//! of unsolicited events onto a channel consumed by the debug session.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;

use crate::dispatcher::{DispatchResult, Dispatcher};
use crate::error::InspectorError;
use crate::protocol::{InspectorEvent, InspectorMessage};

/// Time allowed for the WebSocket connect itself.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for each command to produce a response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A client connected to the debuggee's inspector endpoint.
///
/// Clones share the connection and the id counter. Dropping every clone
/// closes the socket: the writer task ends when the outbound channel is
/// dropped and closes the sink behind it.
#[derive(Debug, Clone)]
pub struct InspectorClient {
    dispatcher: Arc<Mutex<Dispatcher>>,
    writer_tx: mpsc::Sender<String>,
    next_id: Arc<AtomicI64>,
    request_timeout: Duration,
}

impl InspectorClient {
    /// Connect to the inspector endpoint discovered by the launcher.
    ///
    /// Unsolicited events are delivered on `events_tx`; when the socket
    /// closes, every pending command is failed and a final
    /// [`InspectorEvent::Closed`] is emitted.
    pub async fn connect(
        url: &str,
        events_tx: mpsc::UnboundedSender<InspectorEvent>,
    ) -> Result<Self, InspectorError> {
        let (socket, _) = timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(url))
            .await
            .map_err(|_| InspectorError::Connect(format!("timed out connecting to {url}")))?
            .map_err(|e| InspectorError::Connect(e.to_string()))?;
        tracing::debug!("connected to inspector at {url}");

        let (mut sink, mut stream) = socket.split();

        // Writer task: owns the sink, closes it when the channel drops.
        let (writer_tx, mut writer_rx) = mpsc::channel::<String>(64);
        tokio::spawn(async move {
            while let Some(text) = writer_rx.recv().await {
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Reader task: correlates responses, forwards events.
        let dispatcher = Arc::new(Mutex::new(Dispatcher::new()));
        let reader_dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };
                let message: InspectorMessage = match serde_json::from_str(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("unparseable inspector frame: {e}");
                        continue;
                    }
                };
                if message.id.is_some() {
                    reader_dispatcher.lock().await.resolve(message);
                } else if let Some(method) = message.method.as_deref() {
                    let params = message.params.clone().unwrap_or(serde_json::Value::Null);
                    match InspectorEvent::from_message(method, params) {
                        Some(event) => {
                            if events_tx.send(event).is_err() {
                                break;
                            }
                        }
                        None => tracing::debug!("dropping inspector event: {method}"),
                    }
                }
            }
            // Socket gone: fail anything still waiting, then tell the session.
            reader_dispatcher.lock().await.cancel_all();
            let _ = events_tx.send(InspectorEvent::Closed);
        });

        Ok(Self {
            dispatcher,
            writer_tx,
            next_id: Arc::new(AtomicI64::new(1)),
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the per-command response timeout.
    pub fn set_request_timeout(&mut self, request_timeout: Duration) {
        self.request_timeout = request_timeout;
    }

    /// Send a command and wait for its response.
    ///
    /// The id counter is private to this connection and disjoint from the
    /// session's DAP `seq` counter. A response carrying an `error` field
    /// rejects with that message; no response within the timeout rejects
    /// with [`InspectorError::Timeout`].
    pub async fn send(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, InspectorError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&serde_json::json!({
            "id": id,
            "method": method,
            "params": params,
        }))
        .map_err(|e| InspectorError::Transport(e.to_string()))?;

        let rx = self.dispatcher.lock().await.register(id);

        self.writer_tx
            .send(frame)
            .await
            .map_err(|_| InspectorError::Closed)?;

        match timeout(self.request_timeout, rx).await {
            Err(_) => {
                self.dispatcher.lock().await.cancel(id);
                Err(InspectorError::Timeout {
                    method: method.to_string(),
                })
            }
            // Channel closed without a response: the socket went away.
            Ok(Err(_)) => Err(InspectorError::Closed),
            Ok(Ok(DispatchResult::Success(value))) => Ok(value),
            Ok(Ok(DispatchResult::Error(err))) => Err(InspectorError::Rpc {
                message: err.message,
            }),
        }
    }
}
