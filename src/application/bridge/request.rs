//! Parameters of a correlated call.

use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::correlation::{accept_any, Predicate};
use crate::domain::foundation::EventArgs;

/// "Invoke `operation`, then wait for `required_matches` firings of
/// `event_name` that satisfy `predicate`."
///
/// # Example
///
/// ```ignore
/// let call = CorrelatedCall::new("GroupService/getMemberInfo", "GroupListener/onMemberInfoChange")
///     .with_args(vec![json!(group_code), json!([uid]), json!(false)])
///     .with_predicate(move |args| args.first() == Some(&json!(group_code)));
/// let result = bridge.invoke_awaiting_events(call).await?;
/// ```
#[derive(Clone)]
pub struct CorrelatedCall {
    pub operation: String,
    pub event_name: String,
    pub required_matches: usize,
    /// Falls back to the bridge default when unset.
    pub timeout: Option<Duration>,
    pub predicate: Predicate,
    pub args: Vec<JsonValue>,
}

impl CorrelatedCall {
    /// One match of any firing, default timeout, no arguments.
    pub fn new(operation: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            event_name: event_name.into(),
            required_matches: 1,
            timeout: None,
            predicate: accept_any(),
            args: Vec::new(),
        }
    }

    pub fn with_required_matches(mut self, required_matches: usize) -> Self {
        self.required_matches = required_matches;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    /// Sets the predicate. It runs on every firing of the event, so keep it cheap and pure.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EventArgs) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    pub fn with_args(mut self, args: Vec<JsonValue>) -> Self {
        self.args = args;
        self
    }
}

impl fmt::Debug for CorrelatedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelatedCall")
            .field("operation", &self.operation)
            .field("event_name", &self.event_name)
            .field("required_matches", &self.required_matches)
            .field("timeout", &self.timeout)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
