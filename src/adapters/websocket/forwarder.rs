//! Forwards host events to the remote endpoint.
//!
//! # Event Flow
//!
//! ```text
//! Host event fired
//!          │
//!          ▼
//! ┌────────────────────┐
//! │ HostEventForwarder │
//! │  receives event    │
//! └────────────────────┘
//!          │
//!          ▼
//! ┌────────────────────┐
//! │  Wrap as outbound  │
//! │  event object      │
//! └────────────────────┘
//!          │
//!          ▼
//! ┌────────────────────┐
//! │  EventSink::emit   │
//! │  (dropped if not   │
//! │   connected)       │
//! └────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use crate::application::host_queries::{
    ON_GROUP_LIST_UPDATE, ON_MEMBER_INFO_CHANGE, ON_USER_DETAIL_INFO_CHANGED,
};
use crate::domain::foundation::{DomainError, HostEvent};
use crate::ports::{EventSink, HostEventHandler, HostEventSource};

/// Host events pushed to the remote endpoint.
pub const FORWARDED_EVENT_TYPES: &[&str] = &[
    ON_GROUP_LIST_UPDATE,
    ON_MEMBER_INFO_CHANGE,
    ON_USER_DETAIL_INFO_CHANGED,
    "MsgListener/onRecvMsg",
    "BuddyListener/onBuddyListChange",
];

/// Pushes every host event it receives through an `EventSink`.
pub struct HostEventForwarder {
    sink: Arc<dyn EventSink>,
    self_id: u64,
}

impl HostEventForwarder {
    pub fn new(sink: Arc<dyn EventSink>, self_id: u64) -> Self {
        Self { sink, self_id }
    }

    /// Create as an Arc (for sharing with the host).
    pub fn new_shared(sink: Arc<dyn EventSink>, self_id: u64) -> Arc<Self> {
        Arc::new(Self::new(sink, self_id))
    }

    /// Subscribes to every forwarded event type.
    pub fn register(self: &Arc<Self>, source: &dyn HostEventSource) {
        source.subscribe_all(FORWARDED_EVENT_TYPES, self.clone());
    }

    fn transform(&self, event: &HostEvent) -> JsonValue {
        json!({
            "time": event.occurred_at.unix_seconds(),
            "self_id": self.self_id,
            "post_type": "host_event",
            "event_name": event.name,
            "args": event.args,
        })
    }
}

#[async_trait]
impl HostEventHandler for HostEventForwarder {
    async fn handle(&self, event: HostEvent) -> Result<(), DomainError> {
        let delivered = self.sink.emit(&self.transform(&event));
        tracing::debug!(event_name = %event.name, delivered, "Forwarded host event");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HostEventForwarder"
    }
}
