//! Command handler map - name-keyed registry of inbound command handlers.
//!
//! # Example
//!
//! ```ignore
//! let mut commands = CommandHandlerMap::new();
//! commands.register(Arc::new(FetchCustomFaceHandler::new(bridge.clone())));
//!
//! let handler = commands.lookup("fetch_custom_face").unwrap();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::ports::{CommandHandler, CommandRegistry};

/// Maps action names to handlers.
///
/// Built once at startup and read-only afterwards.
#[derive(Default, Clone)]
pub struct CommandHandlerMap {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandHandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under its own action name.
    ///
    /// Returns the handler it replaced, if any.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Option<Arc<dyn CommandHandler>> {
        self.handlers
            .insert(handler.action_name().to_string(), handler)
    }

    pub fn with_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.register(handler);
        self
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl CommandRegistry for CommandHandlerMap {
    fn lookup(&self, action_name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(action_name).cloned()
    }
}
