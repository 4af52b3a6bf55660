//! Connection lifecycle phases.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Phase of a persistent connection.
///
/// ```text
/// Idle ─► Connecting ─► Open ─► Closing ─► Closed
///  ▲          │          │
///  └──────────┴──────────┘  (attempt failed / socket dropped)
/// ```
///
/// Shutdown reaches `Closed` directly from `Idle` or `Connecting`, and through
/// `Closing` from `Open`. Nothing leaves `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionPhase {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionPhase::Open)
    }
}

impl StateMachine for ConnectionPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionPhase::*;
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Idle, Closed)
                | (Connecting, Open)
                | (Connecting, Idle)
                | (Connecting, Closed)
                | (Open, Idle)
                | (Open, Closing)
                | (Closing, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionPhase::*;
        match self {
            Idle => vec![Connecting, Closed],
            Connecting => vec![Open, Idle, Closed],
            Open => vec![Idle, Closing],
            Closing => vec![Closed],
            Closed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConnectionPhase; 5] = [
        ConnectionPhase::Idle,
        ConnectionPhase::Connecting,
        ConnectionPhase::Open,
        ConnectionPhase::Closing,
        ConnectionPhase::Closed,
    ];

    #[test]
    fn closed_is_the_only_terminal_phase() {
        for phase in ALL {
            assert_eq!(phase.is_terminal(), phase == ConnectionPhase::Closed);
        }
    }

    #[test]
    fn reconnect_cycle_is_valid() {
        let mut phase = ConnectionPhase::Idle;
        for next in [
            ConnectionPhase::Connecting,
            ConnectionPhase::Open,
            ConnectionPhase::Idle,
            ConnectionPhase::Connecting,
            ConnectionPhase::Open,
            ConnectionPhase::Closing,
            ConnectionPhase::Closed,
        ] {
            assert!(phase.advance(next), "{:?} -> {:?}", phase, next);
        }
    }

    #[test]
    fn open_cannot_skip_closing() {
        assert!(!ConnectionPhase::Open.can_transition_to(&ConnectionPhase::Closed));
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for phase in ALL {
            for target in ALL {
                assert_eq!(
                    phase.can_transition_to(&target),
                    phase.valid_transitions().contains(&target),
                    "{:?} -> {:?}",
                    phase,
                    target
                );
            }
        }
    }
}
