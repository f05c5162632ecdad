// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Lifecycle State Machine
//!
//! # States
//!
//! - Draft: packages are being collected
//! - Planned: scope fixed, versions being decided
//! - Versioned: every included package has a next version
//! - NotesReady: release notes generated
//! - Approved: signed off by an actor
//! - Publishing: publish steps running
//! - Published / Failed / Canceled: terminal
//!
//! # Inputs
//!
//! - Plan: Draft → Planned
//! - SetVersions: Planned → Versioned
//! - GenerateNotes: Versioned → NotesReady
//! - Approve: NotesReady → Approved
//! - StartPublish: Approved → Publishing
//! - Complete: Publishing → Published
//! - Fail / Cancel: any non-terminal → Failed / Canceled

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::ReleaseState;

/// Release lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseCommand {
    Plan,
    SetVersions,
    GenerateNotes,
    Approve,
    StartPublish,
    Complete,
    Fail,
    Cancel,
}

impl ReleaseCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::SetVersions => "set_versions",
            Self::GenerateNotes => "generate_notes",
            Self::Approve => "approve",
            Self::StartPublish => "start_publish",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Cancel => "cancel",
        }
    }

    /// State this command leads to when accepted
    pub fn target(&self) -> ReleaseState {
        match self {
            Self::Plan => ReleaseState::Planned,
            Self::SetVersions => ReleaseState::Versioned,
            Self::GenerateNotes => ReleaseState::NotesReady,
            Self::Approve => ReleaseState::Approved,
            Self::StartPublish => ReleaseState::Publishing,
            Self::Complete => ReleaseState::Published,
            Self::Fail => ReleaseState::Failed,
            Self::Cancel => ReleaseState::Canceled,
        }
    }

    /// State the release must be in, `None` for "any non-terminal state"
    pub fn required_state(&self) -> Option<ReleaseState> {
        match self {
            Self::Plan => Some(ReleaseState::Draft),
            Self::SetVersions => Some(ReleaseState::Planned),
            Self::GenerateNotes => Some(ReleaseState::Versioned),
            Self::Approve => Some(ReleaseState::NotesReady),
            Self::StartPublish => Some(ReleaseState::Approved),
            Self::Complete => Some(ReleaseState::Publishing),
            Self::Fail | Self::Cancel => None,
        }
    }
}

impl fmt::Display for ReleaseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for ReleaseState {
    type Input = ReleaseCommand;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        if self.is_terminal() {
            return Err(TransitionError::TerminalState {
                state: self.to_string(),
            });
        }

        match input.required_state() {
            None => Ok((input.target(), ())),
            Some(required) if required == *self => Ok((input.target(), ())),
            Some(_) => Err(TransitionError::InvalidTransition {
                from: self.to_string(),
                command: input.as_str(),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use ReleaseCommand::*;

        let forward = match self {
            ReleaseState::Draft => Some(Plan),
            ReleaseState::Planned => Some(SetVersions),
            ReleaseState::Versioned => Some(GenerateNotes),
            ReleaseState::NotesReady => Some(Approve),
            ReleaseState::Approved => Some(StartPublish),
            ReleaseState::Publishing => Some(Complete),
            ReleaseState::Published | ReleaseState::Failed | ReleaseState::Canceled => {
                return Vec::new()
            }
        };

        forward.into_iter().chain([Fail, Cancel]).collect()
    }
}
