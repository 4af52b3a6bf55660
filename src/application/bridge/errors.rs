//! Errors surfaced to callers of the correlation bridge.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Failure of a correlated or direct call.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Deadline passed before the call resolved.
    ///
    /// `target` is the event name for correlated calls and the operation
    /// name for direct calls.
    #[error("Call on '{target}' timed out after {elapsed_ms}ms")]
    CallTimeout { target: String, elapsed_ms: u64 },

    /// The host operation itself failed.
    #[error("Operation '{operation}' failed: {source}")]
    OperationInvocation {
        operation: String,
        #[source]
        source: DomainError,
    },

    /// The pending call was removed by its owner before resolving.
    #[error("Pending call on '{event_name}' was evicted")]
    Evicted { event_name: String },

    /// The call parameters were rejected before anything was invoked.
    #[error("Invalid call: {0}")]
    InvalidCall(#[from] ValidationError),
}

impl BridgeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::CallTimeout { .. })
    }
}

impl From<BridgeError> for DomainError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::CallTimeout { ref target, elapsed_ms } => {
                DomainError::new(ErrorCode::Timeout, err.to_string())
                    .with_detail("target", target.clone())
                    .with_detail("elapsed_ms", elapsed_ms.to_string())
            }
            BridgeError::OperationInvocation { source, .. } => source,
            BridgeError::Evicted { .. } => DomainError::new(ErrorCode::InternalError, err.to_string()),
            BridgeError::InvalidCall(inner) => inner.into(),
        }
    }
}
