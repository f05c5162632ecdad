// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Aggregate
//!
//! The authoritative state machine for one release across one or more
//! packages.
//!
//! # Architecture
//!
//! ```text
//! method(...) → guard (state machine) → mutate → append event
//!                    ↓ (rejected)
//!               ReleaseError, nothing changed
//! ```
//!
//! # Unit of Work
//!
//! The aggregate holds no lock. It is loaded, mutated and persisted inside
//! one externally serialized unit of work; concurrent attempts on the same
//! release must be serialized by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::package::{PackageError, PackageRelease};
use crate::domain::{
    BumpType, PackageState, ReleaseId, ReleaseState, ReleaseStrategy, SemanticVersion,
};
use crate::events::*;
use crate::state_machine::{ReleaseCommand, StateMachine, TransitionError};

/// Release aggregate errors
///
/// Every error is raised before any mutation, so a failed call leaves the
/// aggregate exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReleaseError {
    /// State guard violated
    #[error("Cannot {action} release {release_id}: state is {from}, expected {expected}")]
    InvalidTransition {
        release_id: ReleaseId,
        action: &'static str,
        from: ReleaseState,
        expected: String,
    },

    /// Package path already part of the release
    #[error("Package {0} is already part of the release")]
    DuplicatePackage(String),

    /// Planning requires at least one package
    #[error("Release {0} has no packages")]
    EmptyRelease(ReleaseId),

    /// An included package has no next version
    #[error("Package {0} is included but has no next version")]
    MissingVersion(String),

    /// Fail/Cancel attempted on a terminal release
    #[error("Release {release_id} is already {state}")]
    TerminalState {
        release_id: ReleaseId,
        state: ReleaseState,
    },

    /// No package with this path
    #[error("Package {0} not found in release")]
    PackageNotFound(String),

    /// Dependency edge not recorded on the package
    #[error("Package {package} does not depend on {dependency}")]
    DependencyNotFound { package: String, dependency: String },

    /// Package-level guard violated
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Release aggregate result type
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Release Aggregate Root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAggregate {
    id: ReleaseId,
    repo_id: String,
    base_ref: String,
    head_ref: String,
    packages: Vec<PackageRelease>,
    state: ReleaseState,
    strategy: ReleaseStrategy,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    published_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,

    /// Pending domain events, drained by [`flush_events`](Self::flush_events)
    #[serde(skip)]
    events: Vec<ReleaseEvent>,
}

impl ReleaseAggregate {
    /// Create a new release in Draft
    ///
    /// Emits `ReleaseCreated`. Always succeeds.
    pub fn create(
        repo_id: impl Into<String>,
        base_ref: impl Into<String>,
        head_ref: impl Into<String>,
        strategy: ReleaseStrategy,
    ) -> Self {
        let now = Utc::now();
        let mut release = Self {
            id: ReleaseId::new(),
            repo_id: repo_id.into(),
            base_ref: base_ref.into(),
            head_ref: head_ref.into(),
            packages: Vec::new(),
            state: ReleaseState::Draft,
            strategy,
            created_at: now,
            updated_at: now,
            approved_at: None,
            approved_by: None,
            published_at: None,
            failure_reason: None,
            events: Vec::new(),
        };

        release.record(ReleaseEvent::ReleaseCreated(ReleaseCreated {
            event_id: Uuid::now_v7(),
            release_id: release.id,
            timestamp: now,
            repo_id: release.repo_id.clone(),
            base_ref: release.base_ref.clone(),
            head_ref: release.head_ref.clone(),
            strategy,
        }));

        release
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn id(&self) -> ReleaseId {
        self.id
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn base_ref(&self) -> &str {
        &self.base_ref
    }

    pub fn head_ref(&self) -> &str {
        &self.head_ref
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    pub fn strategy(&self) -> ReleaseStrategy {
        self.strategy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Packages in insertion order
    pub fn packages(&self) -> &[PackageRelease] {
        &self.packages
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn package(&self, path: &str) -> Option<&PackageRelease> {
        self.packages.iter().find(|p| p.path() == path)
    }

    pub fn included_packages(&self) -> impl Iterator<Item = &PackageRelease> {
        self.packages.iter().filter(|p| p.is_included())
    }

    /// First included (or released) package in insertion order
    ///
    /// Supplies the version and notes for release-wide steps when no package
    /// is named explicitly.
    pub fn primary_package(&self) -> Option<&PackageRelease> {
        self.packages.iter().find(|p| p.state().is_releasable())
    }

    /// Version changes of included/released packages
    pub fn version_summary(&self) -> Vec<VersionChange> {
        self.packages
            .iter()
            .filter(|p| p.state().is_releasable())
            .map(PackageRelease::version_change)
            .collect()
    }

    /// Events recorded since the last flush
    pub fn pending_events(&self) -> &[ReleaseEvent] {
        &self.events
    }

    /// Drain buffered events in FIFO order; the buffer is left empty
    pub fn flush_events(&mut self) -> Vec<ReleaseEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Package management
    // ------------------------------------------------------------------

    /// Add a package (Draft/Planned only)
    pub fn add_package(&mut self, package: PackageRelease) -> ReleaseResult<()> {
        if self.package(package.path()).is_some() {
            return Err(ReleaseError::DuplicatePackage(package.path().to_string()));
        }
        self.require_package_scope("add package to")?;

        let now = Utc::now();
        self.record(ReleaseEvent::PackageAdded(PackageAdded {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            package_path: package.path().to_string(),
            package_name: package.name().to_string(),
            package_type: package.package_type(),
            current_version: package.current_version().clone(),
        }));
        self.packages.push(package);
        self.updated_at = now;
        Ok(())
    }

    pub fn include_package(&mut self, path: &str) -> ReleaseResult<()> {
        self.require_package_scope("include package in")?;
        self.package_mut(path)?.include()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn exclude_package(&mut self, path: &str) -> ReleaseResult<()> {
        self.require_package_scope("exclude package from")?;
        self.package_mut(path)?.exclude()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn skip_package(&mut self, path: &str) -> ReleaseResult<()> {
        self.require_package_scope("skip package in")?;
        self.package_mut(path)?.skip()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Decide a package's next version (Draft/Planned)
    ///
    /// Emits `PackageVersionBumped`.
    pub fn set_package_version(
        &mut self,
        path: &str,
        next: SemanticVersion,
        bump: BumpType,
    ) -> ReleaseResult<()> {
        self.require_package_scope("set package version in")?;
        let release_id = self.id;
        let package = self.package_mut(path)?;
        let from = package.current_version().clone();
        package.set_version(next.clone(), bump)?;

        let now = Utc::now();
        self.record(ReleaseEvent::PackageVersionBumped(PackageVersionBumped {
            event_id: Uuid::now_v7(),
            release_id,
            timestamp: now,
            package_path: path.to_string(),
            from,
            to: next,
            bump,
        }));
        self.updated_at = now;
        Ok(())
    }

    /// Attach notes to a package (Versioned/NotesReady)
    ///
    /// Emits `PackageNotesGenerated`.
    pub fn set_package_notes(&mut self, path: &str, notes: impl Into<String>) -> ReleaseResult<()> {
        self.require_state(
            "set package notes in",
            &[ReleaseState::Versioned, ReleaseState::NotesReady],
        )?;
        let notes = notes.into();
        let release_id = self.id;
        self.package_mut(path)?.set_notes(notes.clone());

        let now = Utc::now();
        self.record(ReleaseEvent::PackageNotesGenerated(PackageNotesGenerated {
            event_id: Uuid::now_v7(),
            release_id,
            timestamp: now,
            package_path: path.to_string(),
            notes,
        }));
        self.updated_at = now;
        Ok(())
    }

    /// Record that `path`'s dependency on `dependency` moves to `version`
    /// (Planned/Versioned)
    ///
    /// Emits `DependencyVersionUpdated`. Computing which dependents need the
    /// update is the caller's concern.
    pub fn update_dependency_version(
        &mut self,
        path: &str,
        dependency: &str,
        version: SemanticVersion,
    ) -> ReleaseResult<()> {
        self.require_state(
            "update dependency version in",
            &[ReleaseState::Planned, ReleaseState::Versioned],
        )?;
        let package = self
            .package(path)
            .ok_or_else(|| ReleaseError::PackageNotFound(path.to_string()))?;
        if !package.dependencies().contains(dependency) {
            return Err(ReleaseError::DependencyNotFound {
                package: path.to_string(),
                dependency: dependency.to_string(),
            });
        }

        let now = Utc::now();
        self.record(ReleaseEvent::DependencyVersionUpdated(
            DependencyVersionUpdated {
                event_id: Uuid::now_v7(),
                release_id: self.id,
                timestamp: now,
                package_path: path.to_string(),
                dependency_path: dependency.to_string(),
                version,
            },
        ));
        self.updated_at = now;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Draft → Planned; requires at least one package
    pub fn plan(&mut self) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::Plan)?;
        if self.packages.is_empty() {
            return Err(ReleaseError::EmptyRelease(self.id));
        }

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.record(ReleaseEvent::ReleasePlanned(ReleasePlanned {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            package_count: self.packages.len(),
        }));
        Ok(())
    }

    /// Planned → Versioned; every included package needs a non-zero next version
    pub fn set_versions(&mut self) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::SetVersions)?;
        if let Some(missing) = self.included_packages().find(|p| p.next_version().is_zero()) {
            return Err(ReleaseError::MissingVersion(missing.path().to_string()));
        }

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.record(ReleaseEvent::ReleaseVersioned(ReleaseVersioned {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            versions: self.version_summary(),
        }));
        Ok(())
    }

    /// Versioned → NotesReady
    pub fn generate_notes(&mut self) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::GenerateNotes)?;

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.record(ReleaseEvent::ReleaseNotesReady(ReleaseNotesReady {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            packages_with_notes: self
                .packages
                .iter()
                .filter(|p| !p.notes().is_empty())
                .count(),
        }));
        Ok(())
    }

    /// NotesReady → Approved, recording who approved and when
    pub fn approve(&mut self, actor: impl Into<String>) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::Approve)?;
        let actor = actor.into();

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.approved_at = Some(now);
        self.approved_by = Some(actor.clone());
        self.record(ReleaseEvent::ReleaseApproved(ReleaseApproved {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            approved_by: actor,
        }));
        Ok(())
    }

    /// Approved → Publishing
    pub fn start_publish(&mut self) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::StartPublish)?;

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.record(ReleaseEvent::ReleasePublishing(ReleasePublishing {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            package_count: self.included_packages().count(),
        }));
        Ok(())
    }

    /// Publishing → Published
    ///
    /// Every included package is marked released (its next version becomes
    /// current). Emits one `PackagePublished` per package, then
    /// `ReleasePublished`.
    pub fn complete(&mut self) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::Complete)?;
        let versions = self.version_summary();

        // Marked on a copy: an error here leaves the aggregate untouched.
        let mut packages = self.packages.clone();
        for package in packages.iter_mut().filter(|p| p.is_included()) {
            package.mark_released()?;
        }

        let now = Utc::now();
        let release_id = self.id;
        let published: Vec<ReleaseEvent> = packages
            .iter()
            .filter(|p| p.state() == PackageState::Released)
            .map(|p| {
                ReleaseEvent::PackagePublished(PackagePublished {
                    event_id: Uuid::now_v7(),
                    release_id,
                    timestamp: now,
                    package_path: p.path().to_string(),
                    version: p.current_version().clone(),
                    tag_name: p.tag_name().map(str::to_string),
                })
            })
            .collect();

        self.packages = packages;
        self.state = next;
        self.updated_at = now;
        self.published_at = Some(now);
        self.events.extend(published);
        self.record(ReleaseEvent::ReleasePublished(ReleasePublished {
            event_id: Uuid::now_v7(),
            release_id,
            timestamp: now,
            versions,
        }));
        Ok(())
    }

    /// Any non-terminal state → Failed
    pub fn fail(&mut self, reason: impl Into<String>) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::Fail)?;
        let reason = reason.into();
        let failed_in = self.state;

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.failure_reason = Some(reason.clone());
        self.record(ReleaseEvent::ReleaseFailed(ReleaseFailed {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            reason,
            failed_in,
        }));
        Ok(())
    }

    /// Any non-terminal state → Canceled
    pub fn cancel(&mut self, reason: impl Into<String>) -> ReleaseResult<()> {
        let next = self.next_state(ReleaseCommand::Cancel)?;
        let reason = reason.into();
        let canceled_in = self.state;

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;
        self.failure_reason = Some(reason.clone());
        self.record(ReleaseEvent::ReleaseCanceled(ReleaseCanceled {
            event_id: Uuid::now_v7(),
            release_id: self.id,
            timestamp: now,
            reason,
            canceled_in,
        }));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn record(&mut self, event: ReleaseEvent) {
        self.events.push(event);
    }

    fn next_state(&self, command: ReleaseCommand) -> ReleaseResult<ReleaseState> {
        self.state
            .transition(&command)
            .map(|(next, ())| next)
            .map_err(|err| match (err, command) {
                (TransitionError::TerminalState { .. }, ReleaseCommand::Fail | ReleaseCommand::Cancel) => {
                    ReleaseError::TerminalState {
                        release_id: self.id,
                        state: self.state,
                    }
                }
                _ => ReleaseError::InvalidTransition {
                    release_id: self.id,
                    action: command.as_str(),
                    from: self.state,
                    expected: command
                        .required_state()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "a non-terminal state".to_string()),
                },
            })
    }

    fn require_package_scope(&self, action: &'static str) -> ReleaseResult<()> {
        let scoped: Vec<ReleaseState> = ReleaseState::ALL
            .into_iter()
            .filter(ReleaseState::accepts_packages)
            .collect();
        self.require_state(action, &scoped)
    }

    fn require_state(&self, action: &'static str, allowed: &[ReleaseState]) -> ReleaseResult<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(ReleaseError::InvalidTransition {
            release_id: self.id,
            action,
            from: self.state,
            expected: allowed
                .iter()
                .map(ReleaseState::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
        })
    }

    fn package_mut(&mut self, path: &str) -> ReleaseResult<&mut PackageRelease> {
        self.packages
            .iter_mut()
            .find(|p| p.path() == path)
            .ok_or_else(|| ReleaseError::PackageNotFound(path.to_string()))
    }
}
