//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bridge and the outside world. Adapters implement these ports.
//!
//! ## Host Ports
//!
//! - `HostOperations` - Invoke named asynchronous host operations
//! - `HostEventSource` - Subscribe to named host event streams
//! - `HostEventHandler` - Receives host event firings
//! - `HostService` - Both of the above
//!
//! ## Connection Ports
//!
//! - `Connector` - Opens the framed transport to the remote endpoint
//! - `EventSink` - Pushes outbound event objects
//! - `CommandHandler` / `CommandRegistry` - Serve inbound command frames

mod command_handler;
mod connector;
mod event_sink;
mod host_service;

pub use command_handler::{CommandHandler, CommandRegistry};
pub use connector::{ConnectionError, Connector, FrameSink, FrameStream, WireFrame};
pub use event_sink::EventSink;
pub use host_service::{HostEventHandler, HostEventSource, HostOperations, HostService};
