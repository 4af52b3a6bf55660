//! Event correlation bridge.
//!
//! Turns "invoke operation X, then wait for N firings of event Y that satisfy
//! P" into a single awaitable call.
//!
//! # Call Flow
//!
//! ```text
//! invoke_awaiting_events(call)
//!          │
//!          ├──► subscribe to call.event_name (first use only)
//!          ├──► register PendingCall in the SubscriptionIndex
//!          ├──► spawn host.invoke(operation, args)      ──► DirectOutcome
//!          ▼
//! ┌─────────────────────────── select ───────────────────────────┐
//! │ matches delivered   → Ok(CorrelatedResult)                   │
//! │ invocation finished → record DirectOutcome, keep waiting     │
//! │ deadline elapsed    → expire in index → Err(CallTimeout)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Host invocations run on their own task: a call that times out leaves the
//! operation running and discards whatever it eventually returns.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use crate::config::BridgeConfig;
use crate::domain::correlation::{CorrelatedResult, DirectOutcome, PendingCall, SubscriptionIndex};
use crate::domain::foundation::{CorrelationId, DomainError, ErrorCode, HostEvent};
use crate::ports::{HostEventHandler, HostEventSource, HostOperations, HostService};

use super::{BridgeError, CorrelatedCall};

/// Timeout applied when a call does not set its own.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(5000);

type Invocation = JoinHandle<Result<JsonValue, DomainError>>;

/// Owns the subscription index and evaluates every firing against it.
///
/// Registered once per event name with the host; firings of one event are
/// evaluated under the index lock, so two firings never interleave.
struct CorrelationListener {
    index: Mutex<SubscriptionIndex>,
}

impl CorrelationListener {
    fn new() -> Self {
        Self {
            index: Mutex::new(SubscriptionIndex::new()),
        }
    }

    fn index(&self) -> MutexGuard<'_, SubscriptionIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HostEventHandler for CorrelationListener {
    async fn handle(&self, event: HostEvent) -> Result<(), DomainError> {
        let report = self.index().dispatch(&event.name, &event.args);
        if report.evaluated > 0 {
            tracing::debug!(
                event_name = %event.name,
                evaluated = report.evaluated,
                matched = report.matched,
                resolved = report.resolved,
                "Evaluated host event against pending calls"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EventCorrelationBridge"
    }
}

/// Removes the call from the index if the awaiting future is dropped early.
struct Registration<'a> {
    listener: &'a CorrelationListener,
    event_name: String,
    correlation_id: CorrelationId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if self.listener.index().expire(&self.event_name, self.correlation_id) {
            tracing::debug!(
                correlation_id = %self.correlation_id,
                event_name = %self.event_name,
                "Correlated call abandoned by its caller"
            );
        }
    }
}

/// Bridges the callback-driven host into awaitable calls.
pub struct EventCorrelationBridge {
    host: Arc<dyn HostService>,
    listener: Arc<CorrelationListener>,
    subscribed: Mutex<HashSet<String>>,
    default_timeout: Duration,
}

impl EventCorrelationBridge {
    /// Create a bridge with the default call timeout.
    pub fn new(host: Arc<dyn HostService>) -> Self {
        Self::with_default_timeout(host, DEFAULT_CALL_TIMEOUT)
    }

    /// Create a bridge from configuration.
    pub fn with_config(host: Arc<dyn HostService>, config: &BridgeConfig) -> Self {
        Self::with_default_timeout(host, config.default_timeout())
    }

    pub fn with_default_timeout(host: Arc<dyn HostService>, default_timeout: Duration) -> Self {
        Self {
            host,
            listener: Arc::new(CorrelationListener::new()),
            subscribed: Mutex::new(HashSet::new()),
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Invoke `call.operation` and wait for `call.required_matches` qualifying
    /// firings of `call.event_name`.
    ///
    /// Every firing counts, whatever caused it. A failing operation does not
    /// stop the wait; its error is kept in the result, and a call that never
    /// completes still fails with `CallTimeout`.
    pub async fn invoke_awaiting_events(
        &self,
        call: CorrelatedCall,
    ) -> Result<CorrelatedResult, BridgeError> {
        let CorrelatedCall {
            operation,
            event_name,
            required_matches,
            timeout,
            predicate,
            args,
        } = call;

        let started = Instant::now();
        let (pending, mut delivered) = PendingCall::new(
            event_name.as_str(),
            required_matches,
            predicate,
            started + timeout.unwrap_or(self.default_timeout),
        )?;
        let expiry = tokio::time::sleep_until(pending.timeout_at());

        self.ensure_subscribed(&event_name);
        let correlation_id = self.listener.index().register(pending);
        tracing::debug!(
            correlation_id = %correlation_id,
            operation = %operation,
            event_name = %event_name,
            required_matches,
            "Registered correlated call"
        );

        let _registration = Registration {
            listener: &self.listener,
            event_name: event_name.clone(),
            correlation_id,
        };

        let mut invocation = self.spawn_invocation(operation.clone(), args);
        let mut direct = DirectOutcome::Pending;
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;

                received = &mut delivered => {
                    let Ok(matches) = received else {
                        return Err(BridgeError::Evicted { event_name });
                    };
                    if direct.is_pending() && invocation.is_finished() {
                        direct = record_invocation(&operation, (&mut invocation).await);
                    }
                    tracing::debug!(
                        correlation_id = %correlation_id,
                        event_name = %event_name,
                        elapsed_ms = elapsed_ms(started),
                        "Correlated call resolved"
                    );
                    return Ok(CorrelatedResult { correlation_id, direct, matches });
                }

                joined = &mut invocation, if direct.is_pending() => {
                    direct = record_invocation(&operation, joined);
                }

                () = &mut expiry => {
                    if !self.listener.index().expire(&event_name, correlation_id) {
                        // Resolved or evicted first; the delivery branch reports it.
                        continue;
                    }
                    let elapsed_ms = elapsed_ms(started);
                    let operation_error = match &direct {
                        DirectOutcome::Failed(source) => Some(source.to_string()),
                        _ => None,
                    };
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        operation = %operation,
                        event_name = %event_name,
                        elapsed_ms,
                        operation_error = ?operation_error,
                        "Correlated call timed out"
                    );
                    return Err(BridgeError::CallTimeout { target: event_name, elapsed_ms });
                }
            }
        }
    }

    /// Invoke `operation` and return its own result; no event is involved.
    pub async fn invoke_direct(
        &self,
        operation: &str,
        timeout: Duration,
        args: Vec<JsonValue>,
    ) -> Result<JsonValue, BridgeError> {
        let started = Instant::now();
        let invocation = self.spawn_invocation(operation.to_string(), args);

        match tokio::time::timeout(timeout, invocation).await {
            Ok(joined) => flatten(joined).map_err(|source| {
                tracing::warn!(operation = %operation, error = %source, "Host operation failed");
                BridgeError::OperationInvocation {
                    operation: operation.to_string(),
                    source,
                }
            }),
            Err(_) => {
                let elapsed_ms = elapsed_ms(started);
                tracing::warn!(operation = %operation, elapsed_ms, "Direct call timed out");
                Err(BridgeError::CallTimeout {
                    target: operation.to_string(),
                    elapsed_ms,
                })
            }
        }
    }

    /// `invoke_direct` with the bridge's default timeout.
    pub async fn invoke_direct_default(
        &self,
        operation: &str,
        args: Vec<JsonValue>,
    ) -> Result<JsonValue, BridgeError> {
        self.invoke_direct(operation, self.default_timeout, args).await
    }

    /// Evict every pending call waiting on `event_name`.
    ///
    /// Their callers fail with `BridgeError::Evicted`.
    pub fn evict_event(&self, event_name: &str) -> usize {
        let evicted = self.listener.index().evict_event(event_name);
        if evicted > 0 {
            tracing::info!(event_name = %event_name, evicted, "Evicted pending calls");
        }
        evicted
    }

    /// Evict every pending call; used when the owning scope shuts down.
    pub fn evict_all(&self) -> usize {
        let evicted = self.listener.index().evict_all();
        if evicted > 0 {
            tracing::info!(evicted, "Evicted all pending calls");
        }
        evicted
    }

    /// Number of calls currently waiting.
    pub fn pending_count(&self) -> usize {
        self.listener.index().len()
    }

    /// Number of calls currently waiting on `event_name`.
    pub fn pending_for(&self, event_name: &str) -> usize {
        self.listener.index().pending_for(event_name)
    }

    fn ensure_subscribed(&self, event_name: &str) {
        let mut subscribed = self
            .subscribed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscribed.insert(event_name.to_string()) {
            self.host.subscribe(event_name, self.listener.clone());
            tracing::debug!(event_name = %event_name, "Subscribed to host event");
        }
    }

    fn spawn_invocation(&self, operation: String, args: Vec<JsonValue>) -> Invocation {
        let host = Arc::clone(&self.host);
        tokio::spawn(async move { host.invoke(&operation, args).await })
    }
}

fn record_invocation(
    operation: &str,
    joined: Result<Result<JsonValue, DomainError>, JoinError>,
) -> DirectOutcome {
    let outcome = DirectOutcome::from(flatten(joined));
    if let DirectOutcome::Failed(ref err) = outcome {
        tracing::warn!(
            operation = %operation,
            error = %err,
            "Host operation failed; still waiting for events"
        );
    }
    outcome
}

fn flatten(
    joined: Result<Result<JsonValue, DomainError>, JoinError>,
) -> Result<JsonValue, DomainError> {
    joined.unwrap_or_else(|err| {
        Err(DomainError::new(
            ErrorCode::InternalError,
            format!("Host invocation task failed: {}", err),
        ))
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
