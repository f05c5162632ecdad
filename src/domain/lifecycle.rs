// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release and Package Lifecycle States
//!
//! The transition tables live in [`crate::state_machine`]; this module only
//! names the states and their static properties.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Release lifecycle state
///
/// ```text
/// Draft → Planned → Versioned → NotesReady → Approved → Publishing → Published
///   └──────────┴─────────┴──────────┴───────────┴───────────┴──→ Failed | Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
    Draft,
    Planned,
    Versioned,
    NotesReady,
    Approved,
    Publishing,
    Published,
    Failed,
    Canceled,
}

impl ReleaseState {
    /// Every state, in lifecycle order
    pub const ALL: [ReleaseState; 9] = [
        Self::Draft,
        Self::Planned,
        Self::Versioned,
        Self::NotesReady,
        Self::Approved,
        Self::Publishing,
        Self::Published,
        Self::Failed,
        Self::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Planned => "planned",
            Self::Versioned => "versioned",
            Self::NotesReady => "notes_ready",
            Self::Approved => "approved",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Published, Failed and Canceled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Failed | Self::Canceled)
    }

    /// Whether packages may still be added or re-scoped
    pub fn accepts_packages(&self) -> bool {
        matches!(self, Self::Draft | Self::Planned)
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-package state within a release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageState {
    /// Discovered, no decision yet
    #[default]
    Pending,
    /// Will be released
    Included,
    /// Deliberately left out by an operator or policy
    Excluded,
    /// Nothing to release (no relevant changes)
    Skipped,
    /// Published as part of the release
    Released,
}

impl PackageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Included => "included",
            Self::Excluded => "excluded",
            Self::Skipped => "skipped",
            Self::Released => "released",
        }
    }

    /// Included or already released
    pub fn is_releasable(&self) -> bool {
        matches!(self, Self::Included | Self::Released)
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = ReleaseState::ALL
            .into_iter()
            .filter(ReleaseState::is_terminal)
            .collect();
        assert_eq!(
            terminal,
            vec![
                ReleaseState::Published,
                ReleaseState::Failed,
                ReleaseState::Canceled
            ]
        );
    }

    #[test]
    fn test_accepts_packages() {
        assert!(ReleaseState::Draft.accepts_packages());
        assert!(ReleaseState::Planned.accepts_packages());
        assert!(!ReleaseState::Versioned.accepts_packages());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ReleaseState::NotesReady).unwrap();
        assert_eq!(json, "\"notes_ready\"");
        assert_eq!(ReleaseState::NotesReady.to_string(), "notes_ready");
    }
}
