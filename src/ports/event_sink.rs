//! EventSink port - pushing event objects to remote consumers.

use serde_json::Value as JsonValue;

/// Port for handing an outbound event to the network layer.
///
/// Delivery is at-most-once: an event emitted while no connection is open
/// is dropped, never queued.
pub trait EventSink: Send + Sync {
    /// Serialize and write `event` as a single frame.
    ///
    /// Returns false if the event was dropped.
    fn emit(&self, event: &JsonValue) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventSink) {}
}
