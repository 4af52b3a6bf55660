//! Lifecycle of a pending correlated call.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// State of a pending call.
///
/// A call leaves `Waiting` at most once; every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// Registered in the subscription index, collecting matches.
    #[default]
    Waiting,
    /// Required number of matches observed.
    Resolved,
    /// Deadline elapsed before enough matches arrived.
    TimedOut,
    /// Removed by its owner before resolving (e.g. shutdown).
    Evicted,
}

impl CallState {
    /// Returns true while the call still accepts events.
    pub fn is_waiting(&self) -> bool {
        matches!(self, CallState::Waiting)
    }
}

impl StateMachine for CallState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CallState::*;
        matches!(
            (self, target),
            (Waiting, Resolved) | (Waiting, TimedOut) | (Waiting, Evicted)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CallState::*;
        match self {
            Waiting => vec![Resolved, TimedOut, Evicted],
            Resolved | TimedOut | Evicted => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_can_leave_to_any_terminal_state() {
        for target in [CallState::Resolved, CallState::TimedOut, CallState::Evicted] {
            assert!(CallState::Waiting.can_transition_to(&target));
        }
    }

    #[test]
    fn terminal_states_are_final() {
        for state in [CallState::Resolved, CallState::TimedOut, CallState::Evicted] {
            assert!(state.is_terminal());
            assert!(!state.can_transition_to(&CallState::Waiting));
        }
    }

    #[test]
    fn resolved_cannot_become_timed_out() {
        let mut state = CallState::Resolved;
        assert!(!state.advance(CallState::TimedOut));
        assert_eq!(state, CallState::Resolved);
    }

    #[test]
    fn default_is_waiting() {
        assert!(CallState::default().is_waiting());
    }
}
