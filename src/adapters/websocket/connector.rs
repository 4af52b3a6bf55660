//! WebSocket transport via tokio-tungstenite.
//!
//! Single responsibility: connect and translate between tungstenite messages
//! and `WireFrame`s. No knowledge of commands, heartbeats, or reconnection.

use async_trait::async_trait;
use futures::{future, SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::ports::{ConnectionError, Connector, FrameSink, FrameStream, WireFrame};

/// Opens `ws://` / `wss://` connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), ConnectionError> {
        tracing::debug!(url = %url, "Connecting to WebSocket");

        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| ConnectionError::Connect(format!("WebSocket connect failed: {}", e)))?;
        let (sink, stream) = ws.split();

        let sink = sink
            .sink_map_err(|e| ConnectionError::Send(e.to_string()))
            .with(|frame: WireFrame| future::ready(Ok::<_, ConnectionError>(to_message(frame))));
        let stream = stream.filter_map(|message| {
            future::ready(match message {
                Ok(message) => from_message(message).map(Ok),
                Err(e) => Some(Err(ConnectionError::Receive(e.to_string()))),
            })
        });

        tracing::debug!(url = %url, "WebSocket connected");
        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

fn to_message(frame: WireFrame) -> Message {
    match frame {
        WireFrame::Text(text) => Message::Text(text),
        WireFrame::Ping(data) => Message::Ping(data),
        WireFrame::Pong(data) => Message::Pong(data),
        WireFrame::Close => Message::Close(None),
    }
}

/// Binary frames are accepted when they hold UTF-8 text; raw frames are skipped.
fn from_message(message: Message) -> Option<WireFrame> {
    match message {
        Message::Text(text) => Some(WireFrame::Text(text)),
        Message::Binary(data) => String::from_utf8(data).ok().map(WireFrame::Text),
        Message::Ping(data) => Some(WireFrame::Ping(data)),
        Message::Pong(data) => Some(WireFrame::Pong(data)),
        Message::Close(_) => Some(WireFrame::Close),
        Message::Frame(_) => None,
    }
}
