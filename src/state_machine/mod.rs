// Copyright (c) 2025 - Cowboy AI, Inc.
//! Lifecycle State Machines
//!
//! Release and package lifecycles are modelled as transition tables over
//! their state enums. A transition never mutates: it answers with the next
//! state or with the reason the command is refused. The aggregate asks
//! first and applies second, so a refused command leaves nothing behind.
//!
//! ```text
//! ReleaseState × ReleaseCommand ──> ReleaseState | TransitionError
//! PackageState × PackageCommand ──> PackageState | TransitionError
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_release::domain::ReleaseState;
//! use cim_release::state_machine::{ReleaseCommand, StateMachine};
//!
//! let (next, _) = ReleaseState::Draft.transition(&ReleaseCommand::Plan).unwrap();
//! assert_eq!(next, ReleaseState::Planned);
//! assert!(!ReleaseState::Published.can_transition(&ReleaseCommand::Cancel));
//! ```

pub mod package_lifecycle;
pub mod release_lifecycle;

pub use package_lifecycle::PackageCommand;
pub use release_lifecycle::ReleaseCommand;

pub type TransitionResult<S> = Result<S, TransitionError>;

/// Why a lifecycle refused a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Cannot {command} from state {from}")]
    InvalidTransition { from: String, command: &'static str },

    /// No command is accepted once a terminal state is reached
    #[error("State {state} is terminal")]
    TerminalState { state: String },
}

/// A lifecycle state driven by typed commands
pub trait StateMachine: Sized + Clone {
    type Input;

    /// Produced alongside the next state; `()` for both lifecycles here
    type Output;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Commands accepted from this state
    fn valid_inputs(&self) -> Vec<Self::Input>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PackageState, ReleaseState};

    #[test]
    fn test_valid_inputs_are_accepted() {
        for state in [ReleaseState::Draft, ReleaseState::Approved, ReleaseState::Publishing] {
            for command in state.valid_inputs() {
                assert!(state.can_transition(&command), "{} {}", state, command);
            }
        }
        for command in PackageState::Pending.valid_inputs() {
            assert!(PackageState::Pending.can_transition(&command));
        }
    }

    #[test]
    fn test_error_messages_name_the_command() {
        let err = ReleaseState::Draft
            .transition(&ReleaseCommand::Approve)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot approve from state draft");
    }
}
