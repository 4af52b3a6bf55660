//! State machine trait for lifecycle enums.
//!
//! Both the pending-call lifecycle (`Waiting → Resolved | TimedOut`) and the
//! connection phase (`Idle → Connecting → Open → …`) are expressed through
//! this trait so every transition is checked in one place.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// let next = ConnectionPhase::Idle.transition_to(ConnectionPhase::Connecting)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Moves `self` to `target` if the transition is valid.
    ///
    /// Returns whether the state changed; invalid transitions leave `self` untouched.
    fn advance(&mut self, target: Self) -> bool {
        match self.transition_to(target) {
            Ok(next) => {
                *self = next;
                true
            }
            Err(_) => false,
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lamp {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Lamp {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Lamp::*;
            matches!((self, target), (Off, On) | (On, Off) | (On, Broken))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Lamp::*;
            match self {
                Off => vec![On],
                On => vec![Off, Broken],
                Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert!(matches!(Lamp::Off.transition_to(Lamp::On), Ok(Lamp::On)));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        assert!(Lamp::Off.transition_to(Lamp::Broken).is_err());
    }

    #[test]
    fn advance_mutates_only_on_valid_transition() {
        let mut lamp = Lamp::Off;
        assert!(!lamp.advance(Lamp::Broken));
        assert_eq!(lamp, Lamp::Off);

        assert!(lamp.advance(Lamp::On));
        assert_eq!(lamp, Lamp::On);
    }

    #[test]
    fn terminal_state_has_no_transitions() {
        assert!(Lamp::Broken.is_terminal());
        assert!(!Lamp::On.is_terminal());
    }
}
