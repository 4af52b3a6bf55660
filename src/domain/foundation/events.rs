//! Host event infrastructure.
//!
//! A host event is one firing of a named callback on the host: a name plus
//! the positional argument tuple the host passed to its listener.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::Timestamp;

/// Positional arguments of one event firing.
pub type EventArgs = Vec<JsonValue>;

/// One firing of a named host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    /// Listener name, e.g. `"GroupListener/onMemberInfoChange"`.
    pub name: String,

    /// Arguments in the order the host passed them.
    pub args: EventArgs,

    /// When the firing was observed.
    pub occurred_at: Timestamp,
}

impl HostEvent {
    /// Creates an event observed now.
    pub fn new(name: impl Into<String>, args: EventArgs) -> Self {
        Self {
            name: name.into(),
            args,
            occurred_at: Timestamp::now(),
        }
    }

    /// Returns the argument at `index`, if the host supplied one.
    pub fn arg(&self, index: usize) -> Option<&JsonValue> {
        self.args.get(index)
    }
}
