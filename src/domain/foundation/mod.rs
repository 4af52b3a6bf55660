//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait, and error
//! types shared by the correlation and connection domains.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventArgs, HostEvent};
pub use ids::CorrelationId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
