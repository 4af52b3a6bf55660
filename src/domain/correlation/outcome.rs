//! Combined result of a correlated call.

use serde_json::Value as JsonValue;

use crate::domain::foundation::{CorrelationId, DomainError, EventArgs};

/// What the triggering host operation produced by the time the call resolved.
///
/// The operation runs independently of event matching, so a call can resolve
/// before the operation returns or even after it failed.
#[derive(Debug, Clone)]
pub enum DirectOutcome {
    /// The operation had not returned yet.
    Pending,
    /// The operation returned this value.
    Returned(JsonValue),
    /// The operation failed; events still satisfied the call.
    Failed(DomainError),
}

impl DirectOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, DirectOutcome::Pending)
    }

    /// The returned value, if the operation completed successfully.
    pub fn value(&self) -> Option<&JsonValue> {
        match self {
            DirectOutcome::Returned(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Result<JsonValue, DomainError>> for DirectOutcome {
    fn from(result: Result<JsonValue, DomainError>) -> Self {
        match result {
            Ok(value) => DirectOutcome::Returned(value),
            Err(err) => DirectOutcome::Failed(err),
        }
    }
}

/// `directResult` plus the matched argument tuples, in arrival order.
#[derive(Debug, Clone)]
pub struct CorrelatedResult {
    pub correlation_id: CorrelationId,
    pub direct: DirectOutcome,
    pub matches: Vec<EventArgs>,
}

impl CorrelatedResult {
    /// The first matched tuple; the whole result when one match was required.
    pub fn first_match(&self) -> Option<&EventArgs> {
        self.matches.first()
    }

    /// The last matched tuple.
    pub fn last_match(&self) -> Option<&EventArgs> {
        self.matches.last()
    }

    /// Argument `index` of the first matched tuple.
    pub fn first_arg(&self, index: usize) -> Option<&JsonValue> {
        self.first_match().and_then(|args| args.get(index))
    }

    pub fn direct_value(&self) -> Option<&JsonValue> {
        self.direct.value()
    }
}
