//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bridge to external systems:
//! - `host` - Host service implementations (in-memory)
//! - `commands` - Inbound command handlers and their registry
//! - `websocket` - Persistent outbound WebSocket connection

pub mod commands;
pub mod host;
pub mod websocket;

pub use commands::{CommandHandlerMap, FetchCustomFaceHandler};
pub use host::InMemoryHostService;
pub use websocket::{
    ActiveWebSocketAdapter, FrameDispatcher, HostEventForwarder, TungsteniteConnector,
};
