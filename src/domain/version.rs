// Copyright (c) 2025 - Cowboy AI, Inc.
//! Semantic Version Value Object
//!
//! Wraps [`semver::Version`] with the operations the release lifecycle
//! needs: zero detection (an unset next version) and bumping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version is empty")]
    Empty,

    #[error("Invalid semantic version '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("Cannot apply {bump} bump to {version}: component overflow")]
    Overflow { version: String, bump: BumpType },
}

/// How a current version maps to its next version
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BumpType {
    /// No release-worthy change
    #[default]
    None,
    /// Backwards compatible fix
    Patch,
    /// Backwards compatible feature
    Minor,
    /// Breaking change
    Major,
}

impl BumpType {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }

    /// Whether this bump produces a new version
    pub fn is_release(&self) -> bool {
        *self != Self::None
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BumpType {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "patch" | "fix" => Ok(Self::Patch),
            "minor" | "feature" => Ok(Self::Minor),
            "major" | "breaking" => Ok(Self::Major),
            other => Err(VersionError::Invalid {
                input: other.to_string(),
                reason: "unknown bump type".to_string(),
            }),
        }
    }
}

/// Semantic version (`MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`)
///
/// # Examples
///
/// ```rust
/// use cim_release::domain::{BumpType, SemanticVersion};
///
/// let current = SemanticVersion::parse("1.2.3").unwrap();
/// assert_eq!(current.bump(BumpType::Minor).to_string(), "1.3.0");
/// assert!(SemanticVersion::zero().is_zero());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticVersion(semver::Version);

impl SemanticVersion {
    /// Create a release version without prerelease or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// The zero version, used as "not yet decided"
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a version, tolerating a leading `v` as used in tag names
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);
        semver::Version::parse(raw)
            .map(Self)
            .map_err(|e| VersionError::Invalid {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Prerelease identifier, if any (e.g. `rc.1`)
    pub fn prerelease(&self) -> Option<&str> {
        (!self.0.pre.is_empty()).then(|| self.0.pre.as_str())
    }

    /// Build metadata, if any
    pub fn build_metadata(&self) -> Option<&str> {
        (!self.0.build.is_empty()).then(|| self.0.build.as_str())
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// True when the core triple is `0.0.0` and nothing else is set
    pub fn is_zero(&self) -> bool {
        self.0.major == 0
            && self.0.minor == 0
            && self.0.patch == 0
            && self.0.pre.is_empty()
            && self.0.build.is_empty()
    }

    /// Compute the next version for a bump
    ///
    /// Any bump clears prerelease and build metadata. `None` returns the
    /// version unchanged. A component already at `u64::MAX` saturates; use
    /// [`checked_bump`](Self::checked_bump) to detect that case.
    pub fn bump(&self, bump: BumpType) -> Self {
        let v = &self.0;
        match bump {
            BumpType::None => self.clone(),
            BumpType::Patch => Self::new(v.major, v.minor, v.patch.saturating_add(1)),
            BumpType::Minor => Self::new(v.major, v.minor.saturating_add(1), 0),
            BumpType::Major => Self::new(v.major.saturating_add(1), 0, 0),
        }
    }

    /// Like [`bump`](Self::bump), but fails when the bumped component overflows
    pub fn checked_bump(&self, bump: BumpType) -> Result<Self, VersionError> {
        let v = &self.0;
        let next = match bump {
            BumpType::None => Some(self.clone()),
            BumpType::Patch => v.patch.checked_add(1).map(|p| Self::new(v.major, v.minor, p)),
            BumpType::Minor => v.minor.checked_add(1).map(|m| Self::new(v.major, m, 0)),
            BumpType::Major => v.major.checked_add(1).map(|m| Self::new(m, 0, 0)),
        };
        next.ok_or_else(|| VersionError::Overflow {
            version: self.to_string(),
            bump,
        })
    }

    /// Attach a prerelease identifier
    pub fn with_prerelease(&self, pre: &str) -> Result<Self, VersionError> {
        let pre = semver::Prerelease::new(pre).map_err(|e| VersionError::Invalid {
            input: pre.to_string(),
            reason: e.to_string(),
        })?;
        let mut inner = self.0.clone();
        inner.pre = pre;
        Ok(Self(inner))
    }

    /// Borrow the underlying `semver` value
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl Default for SemanticVersion {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<semver::Version> for SemanticVersion {
    fn from(version: semver::Version) -> Self {
        Self(version)
    }
}

/// Compute the next version of `current` for `bump`
pub fn calculate_next_version(current: &SemanticVersion, bump: BumpType) -> SemanticVersion {
    current.bump(bump)
}
