//! Application layer - awaitable calls over the host.
//!
//! - `bridge` - correlates host operations with the events that report them
//! - `host_queries` - typed group and profile lookups built on the bridge

pub mod bridge;
pub mod host_queries;

pub use bridge::{BridgeError, CorrelatedCall, EventCorrelationBridge};
pub use host_queries::HostQueries;
