//! Connection domain - lifecycle phases and wire frames of the persistent link.

mod frames;
mod phase;

pub use frames::{HeartbeatEvent, HeartbeatStatus, InboundFrame};
pub use phase::ConnectionPhase;
