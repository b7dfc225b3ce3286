//! Client-side wire codec.
//!
//! The client WebSocket carries one DAP JSON message per text frame, so
//! framing reduces to JSON encode/decode plus classifying the message type.

use crate::error::DapError;
use crate::protocol::Request;

/// Decode one client text frame.
///
/// Returns the parsed request, or `None` when the frame is valid JSON but
/// not a request (responses and events from the client are ignored, as is
/// a reverse-request channel the bridge does not implement).
pub fn decode_request(text: &str) -> Result<Option<Request>, DapError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| DapError::InvalidMessage(format!("JSON parse error: {e}")))?;

    match value.get("type").and_then(|t| t.as_str()) {
        Some("request") => {
            let request: Request = serde_json::from_value(value)
                .map_err(|e| DapError::InvalidMessage(format!("malformed request: {e}")))?;
            Ok(Some(request))
        }
        Some(other) => {
            tracing::debug!("ignoring client frame of type {other:?}");
            Ok(None)
        }
        None => Err(DapError::InvalidMessage("missing message type".into())),
    }
}

/// Encode an outgoing DAP message (response or event) as a text frame.
pub fn encode_message<T: serde::Serialize>(message: &T) -> Result<String, DapError> {
    serde_json::to_string(message).map_err(|e| DapError::InvalidMessage(e.to_string()))
}
