// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release lifecycle hooks
//!
//! Closed set of extension points. Each lifecycle stage has a `pre-`/`post-`
//! pair; `on-success` and `on-error` fire once a release ends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extension point in the release lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hook {
    PreInit,
    PostInit,
    PrePlan,
    PostPlan,
    PreVersion,
    PostVersion,
    PreNotes,
    PostNotes,
    PreApprove,
    PostApprove,
    PrePublish,
    PostPublish,
    OnSuccess,
    OnError,
}

/// Unknown hook name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown hook: {0}")]
pub struct UnknownHook(pub String);

impl Hook {
    /// Every hook, in lifecycle order
    pub const ALL: [Hook; 14] = [
        Self::PreInit,
        Self::PostInit,
        Self::PrePlan,
        Self::PostPlan,
        Self::PreVersion,
        Self::PostVersion,
        Self::PreNotes,
        Self::PostNotes,
        Self::PreApprove,
        Self::PostApprove,
        Self::PrePublish,
        Self::PostPublish,
        Self::OnSuccess,
        Self::OnError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreInit => "pre-init",
            Self::PostInit => "post-init",
            Self::PrePlan => "pre-plan",
            Self::PostPlan => "post-plan",
            Self::PreVersion => "pre-version",
            Self::PostVersion => "post-version",
            Self::PreNotes => "pre-notes",
            Self::PostNotes => "post-notes",
            Self::PreApprove => "pre-approve",
            Self::PostApprove => "post-approve",
            Self::PrePublish => "pre-publish",
            Self::PostPublish => "post-publish",
            Self::OnSuccess => "on-success",
            Self::OnError => "on-error",
        }
    }

    pub fn is_pre(&self) -> bool {
        matches!(
            self,
            Self::PreInit
                | Self::PrePlan
                | Self::PreVersion
                | Self::PreNotes
                | Self::PreApprove
                | Self::PrePublish
        )
    }

    pub fn is_post(&self) -> bool {
        matches!(
            self,
            Self::PostInit
                | Self::PostPlan
                | Self::PostVersion
                | Self::PostNotes
                | Self::PostApprove
                | Self::PostPublish
        )
    }

    /// `on-success` / `on-error`
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::OnSuccess | Self::OnError)
    }

    /// The other half of a pre/post pair; lifecycle hooks have none
    pub fn paired(&self) -> Option<Hook> {
        let pair = match self {
            Self::PreInit => Self::PostInit,
            Self::PostInit => Self::PreInit,
            Self::PrePlan => Self::PostPlan,
            Self::PostPlan => Self::PrePlan,
            Self::PreVersion => Self::PostVersion,
            Self::PostVersion => Self::PreVersion,
            Self::PreNotes => Self::PostNotes,
            Self::PostNotes => Self::PreNotes,
            Self::PreApprove => Self::PostApprove,
            Self::PostApprove => Self::PreApprove,
            Self::PrePublish => Self::PostPublish,
            Self::PostPublish => Self::PrePublish,
            Self::OnSuccess | Self::OnError => return None,
        };
        Some(pair)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Hook {
    type Err = UnknownHook;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| UnknownHook(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_hook_has_exactly_one_kind() {
        for hook in Hook::ALL {
            let kinds = [hook.is_pre(), hook.is_post(), hook.is_lifecycle()];
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1, "{hook}");
        }
    }

    #[test]
    fn test_pairing_is_an_involution() {
        for hook in Hook::ALL.into_iter().filter(|h| !h.is_lifecycle()) {
            let pair = hook.paired().unwrap();
            assert_ne!(pair, hook);
            assert_eq!(pair.paired(), Some(hook));
            assert_eq!(hook.is_pre(), pair.is_post());
        }
        assert_eq!(Hook::OnError.paired(), None);
    }

    #[test]
    fn test_parse_round_trip() {
        for hook in Hook::ALL {
            assert_eq!(hook.as_str().parse::<Hook>().unwrap(), hook);
        }
        assert_eq!(
            "post-deploy".parse::<Hook>(),
            Err(UnknownHook("post-deploy".to_string()))
        );
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&Hook::PostPublish).unwrap();
        assert_eq!(json, format!("\"{}\"", Hook::PostPublish));
    }
}
