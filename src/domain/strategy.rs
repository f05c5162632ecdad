// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Versioning Strategy

use serde::{Deserialize, Serialize};
use std::fmt;

/// How bump decisions are coordinated across the packages of a release
///
/// The aggregate records the strategy but only enforces per-package
/// invariants; coordinating versions is up to the planner that calls
/// `set_package_version`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStrategy {
    /// Every package versions on its own
    #[default]
    Independent,
    /// All packages share one version
    Lockstep,
    /// Packages version together within release groups
    Hybrid,
}

impl ReleaseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Lockstep => "lockstep",
            Self::Hybrid => "hybrid",
        }
    }

    /// Whether packages are expected to share versions (globally or per group)
    pub fn shares_versions(&self) -> bool {
        !matches!(self, Self::Independent)
    }
}

impl fmt::Display for ReleaseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
