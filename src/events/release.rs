// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Domain Events
//!
//! Every state change of a release aggregate (and of its packages) is
//! recorded as one of these immutable facts. The aggregate appends them to
//! its buffer synchronously; a driver drains the buffer once and hands the
//! events to an [`EventPublisher`](crate::ports::EventPublisher).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    BumpType, PackageType, ReleaseId, ReleaseState, ReleaseStrategy, SemanticVersion,
};

/// Release Domain Events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseEvent {
    /// Release aggregate was created in Draft
    ReleaseCreated(ReleaseCreated),

    /// Package joined the release
    PackageAdded(PackageAdded),

    /// Release scope was fixed
    ReleasePlanned(ReleasePlanned),

    /// All included packages received a next version
    ReleaseVersioned(ReleaseVersioned),

    /// Release notes were generated
    ReleaseNotesReady(ReleaseNotesReady),

    /// Release was approved by an actor
    ReleaseApproved(ReleaseApproved),

    /// Publishing started
    ReleasePublishing(ReleasePublishing),

    /// Release was published
    ReleasePublished(ReleasePublished),

    /// Release failed
    ReleaseFailed(ReleaseFailed),

    /// Release was canceled
    ReleaseCanceled(ReleaseCanceled),

    /// A package's next version was decided
    PackageVersionBumped(PackageVersionBumped),

    /// Notes were attached to a package
    PackageNotesGenerated(PackageNotesGenerated),

    /// A package was released
    PackagePublished(PackagePublished),

    /// A package's dependency on another package was moved to a new version
    DependencyVersionUpdated(DependencyVersionUpdated),
}

/// One package's version change, as summarised in lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChange {
    pub package_path: String,
    pub package_name: String,
    pub from: SemanticVersion,
    pub to: SemanticVersion,
    pub bump: BumpType,
}

/// Release aggregate was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCreated {
    /// Unique event identifier (UUID v7 for time ordering)
    pub event_id: Uuid,

    /// Release aggregate ID
    pub release_id: ReleaseId,

    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// Repository the release belongs to
    pub repo_id: String,

    /// Ref the release is computed from (usually the previous tag)
    pub base_ref: String,

    /// Ref being released
    pub head_ref: String,

    pub strategy: ReleaseStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAdded {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub package_path: String,
    pub package_name: String,
    pub package_type: PackageType,
    pub current_version: SemanticVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePlanned {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    /// Number of packages in the release at planning time
    pub package_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVersioned {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    /// Version summary, limited to included/released packages
    pub versions: Vec<VersionChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotesReady {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    /// Packages that carry non-empty notes
    pub packages_with_notes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseApproved {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    /// Actor who approved
    pub approved_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePublishing {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    /// Packages about to be published
    pub package_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePublished {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub versions: Vec<VersionChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFailed {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub reason: String,

    /// State the release was in when it failed
    pub failed_in: ReleaseState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCanceled {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub reason: String,

    /// State the release was in when it was canceled
    pub canceled_in: ReleaseState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersionBumped {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub package_path: String,
    pub from: SemanticVersion,
    pub to: SemanticVersion,
    pub bump: BumpType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageNotesGenerated {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub package_path: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePublished {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    pub package_path: String,
    pub version: SemanticVersion,
    pub tag_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyVersionUpdated {
    pub event_id: Uuid,
    pub release_id: ReleaseId,
    pub timestamp: DateTime<Utc>,

    /// Package whose manifest references the dependency
    pub package_path: String,

    /// Path of the dependency package
    pub dependency_path: String,

    pub version: SemanticVersion,
}

impl ReleaseEvent {
    /// Extract the release ID from any event type
    pub fn release_id(&self) -> ReleaseId {
        use ReleaseEvent::*;

        match self {
            ReleaseCreated(e) => e.release_id,
            PackageAdded(e) => e.release_id,
            ReleasePlanned(e) => e.release_id,
            ReleaseVersioned(e) => e.release_id,
            ReleaseNotesReady(e) => e.release_id,
            ReleaseApproved(e) => e.release_id,
            ReleasePublishing(e) => e.release_id,
            ReleasePublished(e) => e.release_id,
            ReleaseFailed(e) => e.release_id,
            ReleaseCanceled(e) => e.release_id,
            PackageVersionBumped(e) => e.release_id,
            PackageNotesGenerated(e) => e.release_id,
            PackagePublished(e) => e.release_id,
            DependencyVersionUpdated(e) => e.release_id,
        }
    }

    /// Extract the event ID from any event type
    pub fn event_id(&self) -> Uuid {
        use ReleaseEvent::*;

        match self {
            ReleaseCreated(e) => e.event_id,
            PackageAdded(e) => e.event_id,
            ReleasePlanned(e) => e.event_id,
            ReleaseVersioned(e) => e.event_id,
            ReleaseNotesReady(e) => e.event_id,
            ReleaseApproved(e) => e.event_id,
            ReleasePublishing(e) => e.event_id,
            ReleasePublished(e) => e.event_id,
            ReleaseFailed(e) => e.event_id,
            ReleaseCanceled(e) => e.event_id,
            PackageVersionBumped(e) => e.event_id,
            PackageNotesGenerated(e) => e.event_id,
            PackagePublished(e) => e.event_id,
            DependencyVersionUpdated(e) => e.event_id,
        }
    }

    /// Extract event timestamp from any event type
    pub fn timestamp(&self) -> DateTime<Utc> {
        use ReleaseEvent::*;

        match self {
            ReleaseCreated(e) => e.timestamp,
            PackageAdded(e) => e.timestamp,
            ReleasePlanned(e) => e.timestamp,
            ReleaseVersioned(e) => e.timestamp,
            ReleaseNotesReady(e) => e.timestamp,
            ReleaseApproved(e) => e.timestamp,
            ReleasePublishing(e) => e.timestamp,
            ReleasePublished(e) => e.timestamp,
            ReleaseFailed(e) => e.timestamp,
            ReleaseCanceled(e) => e.timestamp,
            PackageVersionBumped(e) => e.timestamp,
            PackageNotesGenerated(e) => e.timestamp,
            PackagePublished(e) => e.timestamp,
            DependencyVersionUpdated(e) => e.timestamp,
        }
    }

    /// Stable, dotted event name (`release.planned`, `package.published`)
    pub fn event_type(&self) -> &'static str {
        use ReleaseEvent::*;

        match self {
            ReleaseCreated(_) => "release.created",
            PackageAdded(_) => "package.added",
            ReleasePlanned(_) => "release.planned",
            ReleaseVersioned(_) => "release.versioned",
            ReleaseNotesReady(_) => "release.notes_ready",
            ReleaseApproved(_) => "release.approved",
            ReleasePublishing(_) => "release.publishing",
            ReleasePublished(_) => "release.published",
            ReleaseFailed(_) => "release.failed",
            ReleaseCanceled(_) => "release.canceled",
            PackageVersionBumped(_) => "package.version_bumped",
            PackageNotesGenerated(_) => "package.notes_generated",
            PackagePublished(_) => "package.published",
            DependencyVersionUpdated(_) => "package.dependency_updated",
        }
    }
}
