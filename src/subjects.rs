// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for release events
//!
//! # Subject Pattern
//!
//! ```text
//! release.{aggregate}.{operation}
//! ```
//!
//! - Precise subscriptions (`release.lifecycle.published`)
//! - Aggregate-level wildcards (`release.package.>`)
//! - Global subscriptions (`release.>`)
//!
//! # Examples
//!
//! ```rust
//! use cim_release::subjects::{AggregateType, Operation, SubjectBuilder};
//!
//! let subject = SubjectBuilder::new(AggregateType::Package)
//!     .operation(Operation::Published)
//!     .build();
//! assert_eq!(subject, "release.package.published");
//!
//! let wildcard = SubjectBuilder::new(AggregateType::Lifecycle).build_wildcard();
//! assert_eq!(wildcard, "release.lifecycle.>");
//! ```

use std::fmt;

use crate::events::ReleaseEvent;

/// Root namespace for all release subjects
pub const RELEASE_ROOT: &str = "release";

/// Entity an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateType {
    /// The release run as a whole
    Lifecycle,
    /// A single package inside a release
    Package,
}

impl fmt::Display for AggregateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateType::Lifecycle => write!(f, "lifecycle"),
            AggregateType::Package => write!(f, "package"),
        }
    }
}

/// Release operations (event types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Created,
    Planned,
    Versioned,
    NotesReady,
    Approved,
    Publishing,
    Published,
    Failed,
    Canceled,

    // Package operations
    Added,
    VersionBumped,
    NotesGenerated,
    DependencyUpdated,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Created => "created",
            Operation::Planned => "planned",
            Operation::Versioned => "versioned",
            Operation::NotesReady => "notes_ready",
            Operation::Approved => "approved",
            Operation::Publishing => "publishing",
            Operation::Published => "published",
            Operation::Failed => "failed",
            Operation::Canceled => "canceled",
            Operation::Added => "added",
            Operation::VersionBumped => "version_bumped",
            Operation::NotesGenerated => "notes_generated",
            Operation::DependencyUpdated => "dependency_updated",
        };
        write!(f, "{}", name)
    }
}

/// Builder for release NATS subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    aggregate: AggregateType,
    operation: Option<Operation>,
}

impl SubjectBuilder {
    pub fn new(aggregate: AggregateType) -> Self {
        Self {
            aggregate,
            operation: None,
        }
    }

    /// Builder pre-filled with the aggregate and operation of `event`
    pub fn for_event(event: &ReleaseEvent) -> Self {
        use ReleaseEvent::*;

        let (aggregate, operation) = match event {
            ReleaseCreated(_) => (AggregateType::Lifecycle, Operation::Created),
            ReleasePlanned(_) => (AggregateType::Lifecycle, Operation::Planned),
            ReleaseVersioned(_) => (AggregateType::Lifecycle, Operation::Versioned),
            ReleaseNotesReady(_) => (AggregateType::Lifecycle, Operation::NotesReady),
            ReleaseApproved(_) => (AggregateType::Lifecycle, Operation::Approved),
            ReleasePublishing(_) => (AggregateType::Lifecycle, Operation::Publishing),
            ReleasePublished(_) => (AggregateType::Lifecycle, Operation::Published),
            ReleaseFailed(_) => (AggregateType::Lifecycle, Operation::Failed),
            ReleaseCanceled(_) => (AggregateType::Lifecycle, Operation::Canceled),
            PackageAdded(_) => (AggregateType::Package, Operation::Added),
            PackageVersionBumped(_) => (AggregateType::Package, Operation::VersionBumped),
            PackageNotesGenerated(_) => (AggregateType::Package, Operation::NotesGenerated),
            PackagePublished(_) => (AggregateType::Package, Operation::Published),
            DependencyVersionUpdated(_) => (AggregateType::Package, Operation::DependencyUpdated),
        };
        Self::new(aggregate).operation(operation)
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// `release.{aggregate}.{operation}`, or the aggregate wildcard when no
    /// operation is set
    pub fn build(self) -> String {
        match self.operation {
            Some(operation) => format!("{}.{}.{}", RELEASE_ROOT, self.aggregate, operation),
            None => self.build_wildcard(),
        }
    }

    /// `release.{aggregate}.>`
    pub fn build_wildcard(self) -> String {
        format!("{}.{}.>", RELEASE_ROOT, self.aggregate)
    }

    /// `release.>`
    pub fn build_all() -> String {
        format!("{}.>", RELEASE_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReleaseAggregate;
    use crate::domain::ReleaseStrategy;

    #[test]
    fn test_subject_builder() {
        let subject = SubjectBuilder::new(AggregateType::Lifecycle)
            .operation(Operation::NotesReady)
            .build();
        assert_eq!(subject, "release.lifecycle.notes_ready");
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(
            SubjectBuilder::new(AggregateType::Package).build(),
            "release.package.>"
        );
        assert_eq!(SubjectBuilder::build_all(), "release.>");
    }

    #[test]
    fn test_subject_follows_event_type() {
        let mut release = ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Hybrid);
        release.cancel("superseded").unwrap();

        for event in release.flush_events() {
            let subject = SubjectBuilder::for_event(&event).build();
            let operation = event.event_type().rsplit('.').next().unwrap_or_default();
            assert!(subject.ends_with(operation), "{subject}");
        }
    }
}
