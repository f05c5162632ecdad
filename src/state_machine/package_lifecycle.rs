// Copyright (c) 2025 - Cowboy AI, Inc.
//! Package Lifecycle State Machine
//!
//! # Inputs
//!
//! - Include: Pending | Excluded → Included
//! - Exclude: Pending | Included → Excluded
//! - Skip: Pending → Skipped
//! - SetVersion(bump): Pending | Included; a real bump promotes
//!   Pending → Included
//! - MarkReleased: Included → Released
//!
//! Included ↔ Excluded is the only two-way pair.

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::{BumpType, PackageState};

/// Package lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageCommand {
    Include,
    Exclude,
    Skip,
    SetVersion(BumpType),
    MarkReleased,
}

impl PackageCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
            Self::Skip => "skip",
            Self::SetVersion(_) => "set_version",
            Self::MarkReleased => "mark_released",
        }
    }
}

impl StateMachine for PackageState {
    type Input = PackageCommand;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use PackageCommand::*;
        use PackageState::*;

        let next = match (self, input) {
            (Pending | Excluded, Include) => Included,
            (Pending | Included, Exclude) => Excluded,
            (Pending, Skip) => Skipped,

            (Pending, SetVersion(bump)) if bump.is_release() => Included,
            (Pending, SetVersion(_)) => Pending,
            (Included, SetVersion(_)) => Included,

            (Included, MarkReleased) => Released,

            (Released, _) => {
                return Err(TransitionError::TerminalState {
                    state: self.to_string(),
                })
            }

            (from, command) => {
                return Err(TransitionError::InvalidTransition {
                    from: from.to_string(),
                    command: command.as_str(),
                })
            }
        };

        Ok((next, ()))
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use PackageCommand::*;
        use PackageState::*;

        match self {
            Pending => vec![Include, Exclude, Skip, SetVersion(BumpType::Patch)],
            Included => vec![Exclude, SetVersion(BumpType::Patch), MarkReleased],
            Excluded => vec![Include],
            Skipped | Released => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_exclude_is_two_way() {
        let (excluded, _) = PackageState::Included
            .transition(&PackageCommand::Exclude)
            .unwrap();
        assert_eq!(excluded, PackageState::Excluded);

        let (included, _) = excluded.transition(&PackageCommand::Include).unwrap();
        assert_eq!(included, PackageState::Included);
    }

    #[test]
    fn test_skipped_cannot_be_reincluded() {
        assert!(!PackageState::Skipped.can_transition(&PackageCommand::Include));
        assert!(!PackageState::Excluded.can_transition(&PackageCommand::Skip));
    }

    #[test]
    fn test_set_version_promotes_pending_only_for_real_bumps() {
        let (state, _) = PackageState::Pending
            .transition(&PackageCommand::SetVersion(BumpType::Minor))
            .unwrap();
        assert_eq!(state, PackageState::Included);

        let (state, _) = PackageState::Pending
            .transition(&PackageCommand::SetVersion(BumpType::None))
            .unwrap();
        assert_eq!(state, PackageState::Pending);
    }

    #[test]
    fn test_set_version_rejected_when_excluded() {
        let result = PackageState::Excluded.transition(&PackageCommand::SetVersion(BumpType::Patch));
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_mark_released_requires_included() {
        assert!(PackageState::Pending
            .transition(&PackageCommand::MarkReleased)
            .is_err());
        assert!(matches!(
            PackageState::Released.transition(&PackageCommand::MarkReleased),
            Err(TransitionError::TerminalState { .. })
        ));
    }
}
