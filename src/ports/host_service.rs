//! Host service ports - the asynchronous façade the bridge drives.
//!
//! The host exposes two things: named operations that complete at some
//! later point, and named event streams whose firings arrive independently
//! of any particular operation.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, HostEvent};

/// Port for invoking named host operations.
///
/// # Example
///
/// ```ignore
/// let groups = host.invoke("GroupService/getGroupList", vec![json!(false)]).await?;
/// ```
#[async_trait]
pub trait HostOperations: Send + Sync {
    /// Invoke `operation` with positional `args` and wait for its own return value.
    ///
    /// Unknown operations fail with `ErrorCode::UnknownOperation`.
    async fn invoke(&self, operation: &str, args: Vec<JsonValue>) -> Result<JsonValue, DomainError>;
}

/// Receives every firing of the host events it subscribed to.
///
/// Implementations should be:
/// - **Quick** - firings of one event are delivered one after another
/// - **Isolated** - errors are logged by the source and never stop delivery
#[async_trait]
pub trait HostEventHandler: Send + Sync {
    async fn handle(&self, event: HostEvent) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to host event streams.
///
/// Subscriptions last for the lifetime of the source.
pub trait HostEventSource: Send + Sync {
    fn subscribe(&self, event_name: &str, handler: Arc<dyn HostEventHandler>);

    /// Subscribe one handler to several events.
    fn subscribe_all(&self, event_names: &[&str], handler: Arc<dyn HostEventHandler>) {
        for event_name in event_names {
            self.subscribe(event_name, handler.clone());
        }
    }
}

/// Combined façade: operations plus event streams.
pub trait HostService: HostOperations + HostEventSource {}

impl<T: HostOperations + HostEventSource> HostService for T {}
