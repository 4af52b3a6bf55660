//! Connector port - establishing the raw framed transport.
//!
//! Single responsibility: open a bidirectional frame channel to an endpoint.
//! No knowledge of commands, heartbeats, or reconnection.

use async_trait::async_trait;
use futures::{Sink, Stream};
use std::pin::Pin;

/// One transport-level frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    Text(String),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Send half of an established transport.
pub type FrameSink = Pin<Box<dyn Sink<WireFrame, Error = ConnectionError> + Send>>;

/// Receive half of an established transport. Ends when the peer goes away.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<WireFrame, ConnectionError>> + Send>>;

/// Errors raised by the persistent connection and its transport.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Connect attempt failed; the connect loop retries it.
    #[error("Connect failed: {0}")]
    Connect(String),

    /// Writing to an established transport failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// Transport-level receive error.
    #[error("Receive failed: {0}")]
    Receive(String),

    /// Inbound frame was not a valid command object.
    #[error("Malformed frame: {0}")]
    FrameParse(#[from] serde_json::Error),

    /// No handler is registered for the frame's action.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A command handler failed while processing a frame.
    #[error("Handler '{action}' failed: {source}")]
    HandlerExecution {
        action: String,
        #[source]
        source: crate::domain::foundation::DomainError,
    },
}

/// Port for opening a transport to `url`.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), ConnectionError>;
}
