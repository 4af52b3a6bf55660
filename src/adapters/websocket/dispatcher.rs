//! Inbound frame dispatch.
//!
//! Parses a text frame into an `InboundFrame`, looks its action up in the
//! command registry and runs the handler on its own task. Malformed frames,
//! unknown actions and handler failures are logged and absorbed here; none of
//! them reaches the connection.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::connection::InboundFrame;
use crate::ports::{CommandRegistry, ConnectionError};

/// Routes inbound frames to command handlers.
#[derive(Clone)]
pub struct FrameDispatcher {
    commands: Arc<dyn CommandRegistry>,
}

impl FrameDispatcher {
    pub fn new(commands: Arc<dyn CommandRegistry>) -> Self {
        Self { commands }
    }

    /// Dispatches one text frame.
    ///
    /// Returns the handler task, or `None` when the frame was discarded.
    pub fn dispatch(&self, text: &str) -> Option<JoinHandle<()>> {
        let frame = match InboundFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                let err = ConnectionError::from(e);
                tracing::warn!(error = %err, "Discarding inbound frame");
                return None;
            }
        };

        let Some(handler) = self.commands.lookup(&frame.action_name) else {
            let err = ConnectionError::UnknownAction(frame.action_name);
            tracing::debug!(error = %err, "Ignoring inbound frame");
            return None;
        };

        let action = frame.action_name;
        let payload = frame.payload;
        Some(tokio::spawn(async move {
            match handler.handle(payload).await {
                Ok(_) => tracing::debug!(action = %action, "Command handled"),
                Err(source) => {
                    let err = ConnectionError::HandlerExecution { action, source };
                    tracing::warn!(error = %err, "Command handler failed");
                }
            }
        }))
    }
}
