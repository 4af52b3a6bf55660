//! One in-flight correlated request.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::domain::foundation::{CorrelationId, EventArgs, StateMachine, ValidationError};

use super::CallState;

/// Side-effect-free test applied to every firing of the watched event.
pub type Predicate = Arc<dyn Fn(&EventArgs) -> bool + Send + Sync>;

/// Builds a predicate that accepts every firing.
pub fn accept_any() -> Predicate {
    Arc::new(|_| true)
}

/// Result of offering one firing to a pending call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The call is no longer waiting; the firing was not evaluated.
    Ignored,
    /// The predicate rejected the firing.
    Rejected,
    /// The firing matched; more matches are still required.
    Matched,
    /// The firing matched and the call now has all required matches.
    Satisfied,
}

/// A correlated call waiting for `required_matches` qualifying firings of `event_name`.
pub struct PendingCall {
    correlation_id: CorrelationId,
    event_name: String,
    required_matches: usize,
    predicate: Predicate,
    timeout_at: Instant,
    collected: Vec<EventArgs>,
    state: CallState,
    completion: Option<oneshot::Sender<Vec<EventArgs>>>,
}

impl PendingCall {
    /// Creates a waiting call.
    ///
    /// Returns the call together with the receiver its matches are delivered on.
    pub fn new(
        event_name: impl Into<String>,
        required_matches: usize,
        predicate: Predicate,
        timeout_at: Instant,
    ) -> Result<(Self, oneshot::Receiver<Vec<EventArgs>>), ValidationError> {
        let event_name = event_name.into();
        if event_name.is_empty() {
            return Err(ValidationError::empty_field("event_name"));
        }
        if required_matches == 0 {
            return Err(ValidationError::out_of_range(
                "required_matches",
                1,
                i64::MAX,
                0,
            ));
        }

        let (tx, rx) = oneshot::channel();
        let call = Self {
            correlation_id: CorrelationId::new(),
            event_name,
            required_matches,
            predicate,
            timeout_at,
            collected: Vec::with_capacity(required_matches),
            state: CallState::Waiting,
            completion: Some(tx),
        };
        Ok((call, rx))
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn required_matches(&self) -> usize {
        self.required_matches
    }

    pub fn timeout_at(&self) -> Instant {
        self.timeout_at
    }

    pub fn collected(&self) -> &[EventArgs] {
        &self.collected
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    /// Evaluates one firing against this call's predicate.
    pub fn observe(&mut self, args: &EventArgs) -> Observation {
        if !self.state.is_waiting() {
            return Observation::Ignored;
        }
        if !(self.predicate)(args) {
            return Observation::Rejected;
        }

        self.collected.push(args.clone());
        if self.collected.len() >= self.required_matches {
            Observation::Satisfied
        } else {
            Observation::Matched
        }
    }

    /// Moves the call to `Resolved` and hands the collected matches to the waiter.
    ///
    /// Returns false if the call had already left `Waiting` or the waiter is gone.
    pub fn resolve(&mut self) -> bool {
        if !self.state.advance(CallState::Resolved) {
            return false;
        }
        match self.completion.take() {
            Some(tx) => tx.send(std::mem::take(&mut self.collected)).is_ok(),
            None => false,
        }
    }

    /// Moves the call to `TimedOut`, dropping the completion channel.
    pub fn expire(&mut self) -> bool {
        self.finish(CallState::TimedOut)
    }

    /// Moves the call to `Evicted`; the waiter observes a closed channel.
    pub fn evict(&mut self) -> bool {
        self.finish(CallState::Evicted)
    }

    fn finish(&mut self, terminal: CallState) -> bool {
        if !self.state.advance(terminal) {
            return false;
        }
        self.completion = None;
        true
    }
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("correlation_id", &self.correlation_id)
            .field("event_name", &self.event_name)
            .field("required_matches", &self.required_matches)
            .field("collected", &self.collected.len())
            .field("state", &self.state)
            .finish()
    }
}
