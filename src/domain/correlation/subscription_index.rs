//! Mapping from event name to the pending calls waiting on it.
//!
//! A call sits in the index under exactly its own event name while it is
//! `Waiting`, and in no bucket afterwards. Every state change out of
//! `Waiting` happens through this type, so whoever owns the index (and
//! serializes access to it) owns the at-most-once guarantee.

use std::collections::HashMap;

use crate::domain::foundation::{CorrelationId, EventArgs};

use super::{Observation, PendingCall};

/// Tally of one firing's evaluation across all interested calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Calls whose predicate was evaluated.
    pub evaluated: usize,
    /// Calls that accepted the firing.
    pub matched: usize,
    /// Calls that reached their required match count and were resolved.
    pub resolved: usize,
}

/// Instance-owned index of pending calls, bucketed by event name.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    by_event: HashMap<String, HashMap<CorrelationId, PendingCall>>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a waiting call under its event name.
    pub fn register(&mut self, call: PendingCall) -> CorrelationId {
        let id = call.correlation_id();
        self.by_event
            .entry(call.event_name().to_string())
            .or_default()
            .insert(id, call);
        id
    }

    /// Offers one firing of `event_name` to every call waiting on it.
    ///
    /// Satisfied calls are resolved and removed before this returns.
    pub fn dispatch(&mut self, event_name: &str, args: &EventArgs) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(bucket) = self.by_event.get_mut(event_name) else {
            return report;
        };

        let mut satisfied = Vec::new();
        for (id, call) in bucket.iter_mut() {
            report.evaluated += 1;
            match call.observe(args) {
                Observation::Matched => report.matched += 1,
                Observation::Satisfied => {
                    report.matched += 1;
                    satisfied.push(*id);
                }
                Observation::Rejected | Observation::Ignored => {}
            }
        }

        for id in satisfied {
            if let Some(mut call) = bucket.remove(&id) {
                if !call.resolve() {
                    tracing::debug!(
                        correlation_id = %id,
                        event_name = %event_name,
                        "Resolved call has no waiter left"
                    );
                }
                report.resolved += 1;
            }
        }

        if bucket.is_empty() {
            self.by_event.remove(event_name);
        }
        report
    }

    /// Removes a call whose deadline has passed.
    ///
    /// Returns false if the call already left the index (it resolved first).
    pub fn expire(&mut self, event_name: &str, id: CorrelationId) -> bool {
        match self.take(event_name, id) {
            Some(mut call) => call.expire(),
            None => false,
        }
    }

    /// Evicts every call waiting on `event_name`.
    pub fn evict_event(&mut self, event_name: &str) -> usize {
        self.by_event.remove(event_name).map_or(0, evict_bucket)
    }

    /// Evicts every pending call in the index.
    pub fn evict_all(&mut self) -> usize {
        self.by_event
            .drain()
            .map(|(_, bucket)| evict_bucket(bucket))
            .sum()
    }

    /// Number of calls currently waiting on `event_name`.
    pub fn pending_for(&self, event_name: &str) -> usize {
        self.by_event.get(event_name).map_or(0, HashMap::len)
    }

    /// Whether `id` is still waiting under `event_name`.
    pub fn contains(&self, event_name: &str, id: CorrelationId) -> bool {
        self.by_event
            .get(event_name)
            .map_or(false, |bucket| bucket.contains_key(&id))
    }

    /// Total number of waiting calls.
    pub fn len(&self) -> usize {
        self.by_event.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }

    fn take(&mut self, event_name: &str, id: CorrelationId) -> Option<PendingCall> {
        let bucket = self.by_event.get_mut(event_name)?;
        let call = bucket.remove(&id);
        if bucket.is_empty() {
            self.by_event.remove(event_name);
        }
        call
    }
}

fn evict_bucket(bucket: HashMap<CorrelationId, PendingCall>) -> usize {
    bucket
        .into_values()
        .map(|mut call| call.evict())
        .filter(|evicted| *evicted)
        .count()
}
