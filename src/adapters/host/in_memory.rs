//! In-memory host service.
//!
//! Stands in for the real host: operations are closures registered by name,
//! and events are fired explicitly with `fire`. Used by tests and by the demo
//! binary.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode, EventArgs, HostEvent};
use crate::ports::{HostEventHandler, HostEventSource, HostOperations};

type Operation =
    Arc<dyn Fn(Vec<JsonValue>) -> BoxFuture<'static, Result<JsonValue, DomainError>> + Send + Sync>;

/// In-process host façade.
///
/// Handlers for one event run sequentially, in subscription order, for each
/// firing; a firing completes before `fire` returns.
///
/// # Example
///
/// ```ignore
/// let host = Arc::new(InMemoryHostService::new());
/// host.register_value("GroupService/getGroupList", json!(null));
///
/// host.fire("GroupListener/onGroupListUpdate", vec![json!(1), json!([])]).await;
/// assert_eq!(host.fired_count("GroupListener/onGroupListUpdate"), 1);
/// ```
pub struct InMemoryHostService {
    operations: RwLock<HashMap<String, Operation>>,
    handlers: RwLock<HashMap<String, Vec<Arc<dyn HostEventHandler>>>>,
    invocations: RwLock<Vec<(String, Vec<JsonValue>)>>,
    fired: RwLock<Vec<HostEvent>>,
}

impl InMemoryHostService {
    pub fn new() -> Self {
        Self {
            operations: RwLock::new(HashMap::new()),
            handlers: RwLock::new(HashMap::new()),
            invocations: RwLock::new(Vec::new()),
            fired: RwLock::new(Vec::new()),
        }
    }

    /// Registers an asynchronous operation under `name`, replacing any
    /// previous one.
    pub fn register<F, Fut>(&self, name: impl Into<String>, operation: F)
    where
        F: Fn(Vec<JsonValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JsonValue, DomainError>> + Send + 'static,
    {
        let operation: Operation = Arc::new(move |args| operation(args).boxed());
        write(&self.operations).insert(name.into(), operation);
    }

    /// Registers an operation that always returns `value`.
    pub fn register_value(&self, name: impl Into<String>, value: JsonValue) {
        self.register(name, move |_| {
            let value = value.clone();
            async move { Ok(value) }
        });
    }

    /// Registers an operation that always fails with `error`.
    pub fn register_error(&self, name: impl Into<String>, error: DomainError) {
        self.register(name, move |_| {
            let error = error.clone();
            async move { Err(error) }
        });
    }

    /// Registers an operation that returns `value` after `delay`.
    pub fn register_delayed(&self, name: impl Into<String>, delay: Duration, value: JsonValue) {
        self.register(name, move |_| {
            let value = value.clone();
            async move {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
        });
    }

    /// Fires `event_name` with `args` to every subscribed handler.
    ///
    /// Handler failures are logged; they never stop delivery to the
    /// remaining handlers.
    pub async fn fire(&self, event_name: impl Into<String>, args: EventArgs) {
        let event = HostEvent::new(event_name, args);
        write(&self.fired).push(event.clone());

        // Clone handlers to release lock before await points
        let event_handlers: Vec<Arc<dyn HostEventHandler>> = read(&self.handlers)
            .get(&event.name)
            .cloned()
            .unwrap_or_default();

        tracing::debug!(
            event_name = %event.name,
            handlers = event_handlers.len(),
            "Firing host event"
        );

        for handler in event_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                tracing::warn!(
                    event_name = %event.name,
                    handler = handler.name(),
                    error = %e,
                    "Host event handler failed"
                );
            }
        }
    }

    // === Test Helpers ===

    /// Arguments of every invocation of `operation`, oldest first.
    pub fn invocations(&self, operation: &str) -> Vec<Vec<JsonValue>> {
        read(&self.invocations)
            .iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn invocation_count(&self, operation: &str) -> usize {
        read(&self.invocations)
            .iter()
            .filter(|(name, _)| name == operation)
            .count()
    }

    pub fn subscriber_count(&self, event_name: &str) -> usize {
        read(&self.handlers).get(event_name).map_or(0, Vec::len)
    }

    /// Every event fired so far, oldest first.
    pub fn fired_events(&self) -> Vec<HostEvent> {
        read(&self.fired).clone()
    }

    pub fn fired_count(&self, event_name: &str) -> usize {
        read(&self.fired)
            .iter()
            .filter(|event| event.name == event_name)
            .count()
    }
}

impl Default for InMemoryHostService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostOperations for InMemoryHostService {
    async fn invoke(&self, operation: &str, args: Vec<JsonValue>) -> Result<JsonValue, DomainError> {
        write(&self.invocations).push((operation.to_string(), args.clone()));

        let registered = read(&self.operations).get(operation).cloned();
        let Some(registered) = registered else {
            return Err(DomainError::new(
                ErrorCode::UnknownOperation,
                format!("No host operation named '{}'", operation),
            ));
        };

        registered(args).await
    }
}

impl HostEventSource for InMemoryHostService {
    fn subscribe(&self, event_name: &str, handler: Arc<dyn HostEventHandler>) {
        write(&self.handlers)
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
