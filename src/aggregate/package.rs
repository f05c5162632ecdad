// Copyright (c) 2025 - Cowboy AI, Inc.
//! Package Release Sub-Entity
//!
//! A package's inclusion, version and publish state within one release.
//! Packages are owned by their [`ReleaseAggregate`](super::ReleaseAggregate)
//! and keyed by path; dependency edges only reference other paths.
//!
//! Every lifecycle method computes the next state through
//! [`PackageState`]'s state machine before touching any field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{BumpType, PackageState, PackageType, SemanticVersion};
use crate::events::VersionChange;
use crate::state_machine::{PackageCommand, StateMachine};

/// Package-level errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PackageError {
    /// State guard violated, nothing was changed
    #[error("Cannot {action} package {package}: state is {from}")]
    InvalidTransition {
        package: String,
        action: &'static str,
        from: PackageState,
    },

    /// Risk score outside 0.0..=1.0
    #[error("Risk score must be within 0.0..=1.0, got {0}")]
    InvalidRiskScore(f64),
}

/// One package's release within a [`ReleaseAggregate`](super::ReleaseAggregate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRelease {
    path: String,
    name: String,
    package_type: PackageType,
    current_version: SemanticVersion,
    next_version: SemanticVersion,
    bump: BumpType,
    state: PackageState,
    changed_files: Vec<String>,
    commit_count: u32,
    notes: String,
    release_group: Option<String>,
    tag_name: Option<String>,
    private: bool,
    dependencies: BTreeSet<String>,
    dependents: BTreeSet<String>,
    risk_score: f64,
    updated_at: DateTime<Utc>,
}

impl PackageRelease {
    /// Create a pending package with no next version yet
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        package_type: PackageType,
        current_version: SemanticVersion,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            package_type,
            current_version,
            next_version: SemanticVersion::zero(),
            bump: BumpType::None,
            state: PackageState::Pending,
            changed_files: Vec::new(),
            commit_count: 0,
            notes: String::new(),
            release_group: None,
            tag_name: None,
            private: false,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            risk_score: 0.0,
            updated_at: Utc::now(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    pub fn current_version(&self) -> &SemanticVersion {
        &self.current_version
    }

    pub fn next_version(&self) -> &SemanticVersion {
        &self.next_version
    }

    pub fn bump(&self) -> BumpType {
        self.bump
    }

    pub fn state(&self) -> PackageState {
        self.state
    }

    pub fn changed_files(&self) -> &[String] {
        &self.changed_files
    }

    pub fn commit_count(&self) -> u32 {
        self.commit_count
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn release_group(&self) -> Option<&str> {
        self.release_group.as_deref()
    }

    /// Explicit tag name, if one was assigned
    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub fn dependents(&self) -> &BTreeSet<String> {
        &self.dependents
    }

    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_included(&self) -> bool {
        self.state == PackageState::Included
    }

    /// Tag for this package: the explicit tag name, or `prefix + next_version`
    pub fn resolve_tag_name(&self, prefix: &str) -> String {
        self.tag_name
            .clone()
            .unwrap_or_else(|| format!("{}{}", prefix, self.next_version))
    }

    /// Current → next summary
    pub fn version_change(&self) -> VersionChange {
        VersionChange {
            package_path: self.path.clone(),
            package_name: self.name.clone(),
            from: self.current_version.clone(),
            to: self.next_version.clone(),
            bump: self.bump,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Pending | Excluded → Included
    pub fn include(&mut self) -> Result<(), PackageError> {
        self.state = self.next_state(PackageCommand::Include)?;
        self.touch();
        Ok(())
    }

    /// Pending | Included → Excluded
    pub fn exclude(&mut self) -> Result<(), PackageError> {
        self.state = self.next_state(PackageCommand::Exclude)?;
        self.touch();
        Ok(())
    }

    /// Pending → Skipped
    pub fn skip(&mut self) -> Result<(), PackageError> {
        self.state = self.next_state(PackageCommand::Skip)?;
        self.touch();
        Ok(())
    }

    /// Record the next version and bump
    ///
    /// Legal from Pending or Included. A real bump on a pending package
    /// includes it: setting a bump expresses intent to release.
    pub fn set_version(&mut self, next: SemanticVersion, bump: BumpType) -> Result<(), PackageError> {
        let state = self.next_state(PackageCommand::SetVersion(bump))?;
        self.state = state;
        self.next_version = next;
        self.bump = bump;
        self.touch();
        Ok(())
    }

    /// Included → Released; the next version becomes current
    pub fn mark_released(&mut self) -> Result<(), PackageError> {
        self.state = self.next_state(PackageCommand::MarkReleased)?;
        self.current_version = self.next_version.clone();
        self.touch();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Append changed files (the list only grows)
    pub fn add_changed_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed_files.extend(files.into_iter().map(Into::into));
        self.touch();
    }

    pub fn set_commit_count(&mut self, count: u32) {
        self.commit_count = count;
        self.touch();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
        self.touch();
    }

    pub fn set_release_group(&mut self, group: impl Into<String>) {
        self.release_group = Some(group.into());
        self.touch();
    }

    pub fn set_tag_name(&mut self, tag: impl Into<String>) {
        self.tag_name = Some(tag.into());
        self.touch();
    }

    pub fn set_private(&mut self, private: bool) {
        self.private = private;
        self.touch();
    }

    /// Record a dependency on another package path; returns false if known
    pub fn add_dependency(&mut self, path: impl Into<String>) -> bool {
        let added = self.dependencies.insert(path.into());
        if added {
            self.touch();
        }
        added
    }

    /// Record a package path that depends on this one; returns false if known
    pub fn add_dependent(&mut self, path: impl Into<String>) -> bool {
        let added = self.dependents.insert(path.into());
        if added {
            self.touch();
        }
        added
    }

    pub fn set_risk_score(&mut self, score: f64) -> Result<(), PackageError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(PackageError::InvalidRiskScore(score));
        }
        self.risk_score = score;
        self.touch();
        Ok(())
    }

    fn next_state(&self, command: PackageCommand) -> Result<PackageState, PackageError> {
        self.state
            .transition(&command)
            .map(|(next, ())| next)
            .map_err(|_| PackageError::InvalidTransition {
                package: self.path.clone(),
                action: command.as_str(),
                from: self.state,
            })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
