//! Command handler ports - how inbound frames reach application code.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::domain::foundation::DomainError;

/// Handles one named command received over the persistent connection.
///
/// The connection adapter runs each invocation on its own task and only
/// logs the outcome; a failing handler never affects the connection.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, payload: JsonValue) -> Result<JsonValue, DomainError>;

    /// Name inbound frames use to address this handler.
    fn action_name(&self) -> &'static str;
}

/// Lookup from action name to handler.
pub trait CommandRegistry: Send + Sync {
    fn lookup(&self, action_name: &str) -> Option<Arc<dyn CommandHandler>>;
}
