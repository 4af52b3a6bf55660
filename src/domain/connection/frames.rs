//! Wire frames exchanged over the persistent connection.
//!
//! Every frame is one JSON object per WebSocket text message:
//! - Remote → Bridge: command invocations (`InboundFrame`)
//! - Bridge → Remote: event objects, including the periodic `HeartbeatEvent`

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;

// ============================================
// Remote → Bridge Frames
// ============================================

/// A command invocation received from the remote end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    /// Name the command handler is registered under.
    pub action_name: String,

    /// Handler input; absent payloads decode as `null`.
    #[serde(default)]
    pub payload: JsonValue,
}

impl InboundFrame {
    /// Decodes one text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// ============================================
// Bridge → Remote Frames
// ============================================

/// Liveness status carried by heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatStatus {
    pub online: bool,
    pub good: bool,
}

/// Periodic liveness frame sent while the connection is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatEvent {
    pub time: i64,
    pub self_id: u64,
    pub post_type: String,
    pub meta_event_type: String,
    pub status: HeartbeatStatus,
    /// Heartbeat interval in milliseconds.
    pub interval: u64,
}

impl HeartbeatEvent {
    pub fn new(self_id: u64, interval_ms: u64, online: bool) -> Self {
        Self {
            time: Timestamp::now().unix_seconds(),
            self_id,
            post_type: "meta_event".to_string(),
            meta_event_type: "heartbeat".to_string(),
            status: HeartbeatStatus { online, good: true },
            interval: interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_action_and_payload() {
        let frame = InboundFrame::parse(r#"{"actionName":"fetch_custom_face","payload":{"count":10}}"#)
            .unwrap();

        assert_eq!(frame.action_name, "fetch_custom_face");
        assert_eq!(frame.payload, json!({"count": 10}));
    }

    #[test]
    fn missing_payload_is_null() {
        let frame = InboundFrame::parse(r#"{"actionName":"ping"}"#).unwrap();
        assert!(frame.payload.is_null());
    }

    #[test]
    fn missing_action_is_a_parse_error() {
        assert!(InboundFrame::parse(r#"{"payload":{}}"#).is_err());
        assert!(InboundFrame::parse("not json").is_err());
    }

    #[test]
    fn heartbeat_serializes_meta_event_shape() {
        let value = serde_json::to_value(HeartbeatEvent::new(42, 30_000, true)).unwrap();

        assert_eq!(value["post_type"], "meta_event");
        assert_eq!(value["meta_event_type"], "heartbeat");
        assert_eq!(value["self_id"], 42);
        assert_eq!(value["interval"], 30_000);
        assert_eq!(value["status"], json!({"online": true, "good": true}));
        assert!(value["time"].as_i64().unwrap() > 0);
    }
}
