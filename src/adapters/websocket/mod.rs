//! WebSocket adapters for the persistent outbound connection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Host Service                                │
//! │   InMemoryHostService (tests, demo binary)                          │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ event firings
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    HostEventForwarder                               │
//! │   - Subscribes to forwarded host events                             │
//! │   - Wraps each firing as an outbound event object                   │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ EventSink::emit
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   ActiveWebSocketAdapter                            │
//! │   connect loop │ heartbeat │ reconnect │ FrameDispatcher (inbound)  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ Connector (TungsteniteConnector)
//!                                     ▼
//!                              remote endpoint
//! ```
//!
//! # Components
//!
//! - [`adapter`] - Connection lifecycle, heartbeat and outbound emission
//! - [`dispatcher`] - Inbound frame parsing and command dispatch
//! - [`connector`] - tokio-tungstenite transport
//! - [`forwarder`] - Bridge between host events and the outbound connection

pub mod adapter;
pub mod connector;
pub mod dispatcher;
pub mod forwarder;

pub use adapter::ActiveWebSocketAdapter;
pub use connector::TungsteniteConnector;
pub use dispatcher::FrameDispatcher;
pub use forwarder::{HostEventForwarder, FORWARDED_EVENT_TYPES};
