//! Response correlation for inspector commands.
//!
//! Tracks pending commands by id and routes each response to the waiting
//! caller through a oneshot completion handle. Arrival order does not
//! matter; the id, not the order, determines correlation.

use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::protocol::{InspectorMessage, RpcError};

/// The result delivered to a waiting command.
#[derive(Debug)]
pub enum DispatchResult {
    /// Successful response with the result value.
    Success(serde_json::Value),
    /// Error response from the debuggee.
    Error(RpcError),
}

/// Manages pending commands and routes responses.
#[derive(Debug, Default)]
pub struct Dispatcher {
    pending: HashMap<i64, oneshot::Sender<DispatchResult>>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending command and return a receiver for its response.
    pub fn register(&mut self, id: i64) -> oneshot::Receiver<DispatchResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        rx
    }

    /// How many commands are pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Route a response to its waiting caller.
    ///
    /// Responses for unknown ids (already timed out, or cancelled) are
    /// dropped with a log line; removal is idempotent.
    pub fn resolve(&mut self, message: InspectorMessage) {
        let Some(id) = message.id else {
            return;
        };
        let Some(sender) = self.pending.remove(&id) else {
            tracing::warn!("response for unknown inspector request id {id}");
            return;
        };
        let result = match message.error {
            Some(err) => DispatchResult::Error(err),
            None => DispatchResult::Success(message.result.unwrap_or(serde_json::Value::Null)),
        };
        // A dropped receiver means the caller gave up; nothing to do.
        let _ = sender.send(result);
    }

    /// Forget a pending command. Returns true if it was still pending.
    pub fn cancel(&mut self, id: i64) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Drop every pending command; their receivers see a closed channel.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(id: i64, result: serde_json::Value) -> InspectorMessage {
        InspectorMessage {
            id: Some(id),
            result: Some(result),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn dispatcher_register_and_resolve() {
        let mut disp = Dispatcher::new();
        let rx = disp.register(1);
        assert_eq!(disp.pending_count(), 1);

        disp.resolve(response(1, serde_json::json!({"breakpointId": "bp1"})));
        assert_eq!(disp.pending_count(), 0);

        match rx.await.unwrap() {
            DispatchResult::Success(val) => assert_eq!(val["breakpointId"], "bp1"),
            DispatchResult::Error(_) => panic!("expected success"),
        }
    }

    #[tokio::test]
    async fn dispatcher_resolve_error() {
        let mut disp = Dispatcher::new();
        let rx = disp.register(1);

        disp.resolve(InspectorMessage {
            id: Some(1),
            error: Some(RpcError {
                message: "Evaluate failed".into(),
                code: Some(-32000),
            }),
            ..Default::default()
        });

        match rx.await.unwrap() {
            DispatchResult::Error(err) => assert_eq!(err.message, "Evaluate failed"),
            DispatchResult::Success(_) => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn dispatcher_out_of_order_responses() {
        let mut disp = Dispatcher::new();
        let rx1 = disp.register(1);
        let rx2 = disp.register(2);

        // The debuggee replies out of order; correlation is by id.
        disp.resolve(response(2, serde_json::json!("second")));
        disp.resolve(response(1, serde_json::json!("first")));

        match rx1.await.unwrap() {
            DispatchResult::Success(val) => assert_eq!(val, "first"),
            _ => panic!("expected success"),
        }
        match rx2.await.unwrap() {
            DispatchResult::Success(val) => assert_eq!(val, "second"),
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn dispatcher_unknown_id_ignored() {
        let mut disp = Dispatcher::new();
        // Must not panic; removal is idempotent.
        disp.resolve(response(999, serde_json::json!(null)));
        assert_eq!(disp.pending_count(), 0);
    }

    #[test]
    fn dispatcher_response_without_id_ignored() {
        let mut disp = Dispatcher::new();
        let _rx = disp.register(1);
        disp.resolve(InspectorMessage::default());
        assert_eq!(disp.pending_count(), 1);
    }

    #[tokio::test]
    async fn dispatcher_null_result() {
        let mut disp = Dispatcher::new();
        let rx = disp.register(1);
        disp.resolve(InspectorMessage {
            id: Some(1),
            ..Default::default()
        });
        match rx.await.unwrap() {
            DispatchResult::Success(val) => assert!(val.is_null()),
            _ => panic!("expected success with null"),
        }
    }

    #[test]
    fn dispatcher_cancel() {
        let mut disp = Dispatcher::new();
        let _rx = disp.register(1);
        assert!(disp.cancel(1));
        assert!(!disp.cancel(1));
        assert!(!disp.cancel(999));
    }

    #[tokio::test]
    async fn dispatcher_cancel_all_closes_receivers() {
        let mut disp = Dispatcher::new();
        let rx1 = disp.register(1);
        let rx2 = disp.register(2);
        disp.cancel_all();
        assert_eq!(disp.pending_count(), 0);
        assert!(rx1.await.is_err());
        assert!(rx2.await.is_err());
    }

    #[tokio::test]
    async fn dispatcher_dropped_receiver_tolerated() {
        let mut disp = Dispatcher::new();
        let rx = disp.register(1);
        drop(rx);
        // Must not panic.
        disp.resolve(response(1, serde_json::json!(null)));
    }
}
