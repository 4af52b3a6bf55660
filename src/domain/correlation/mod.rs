//! Correlation domain - pending calls waiting on host events.
//!
//! ```text
//! invoke operation ──► host ──(returns later)──► DirectOutcome
//!        │
//!        └─ register PendingCall ──► SubscriptionIndex[event_name]
//!                                          ▲
//!                    host event firing ────┘ predicate → collected → Resolved
//! ```

mod call_state;
mod outcome;
mod pending_call;
mod subscription_index;

pub use call_state::CallState;
pub use outcome::{CorrelatedResult, DirectOutcome};
pub use pending_call::{accept_any, Observation, PendingCall, Predicate};
pub use subscription_index::{DispatchReport, SubscriptionIndex};
