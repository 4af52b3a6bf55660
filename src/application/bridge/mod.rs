//! Event correlation bridge.
//!
//! Adapts a host whose operations report their real results through later
//! event callbacks into plain awaitable calls:
//!
//! ```text
//!   caller ──invoke_awaiting_events──► EventCorrelationBridge ──invoke──► host
//!     ▲                                   │  SubscriptionIndex             │
//!     │                                   ▼                                │
//!     └──── CorrelatedResult ◄── CorrelationListener ◄──── event firings ──┘
//! ```

mod correlation_bridge;
mod errors;
mod request;

pub use correlation_bridge::{EventCorrelationBridge, DEFAULT_CALL_TIMEOUT};
pub use errors::BridgeError;
pub use request::CorrelatedCall;
