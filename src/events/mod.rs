// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Domain Events
//!
//! Events are immutable facts representing state changes that have occurred.
//!
//! # Event Principles
//!
//! 1. **Events are immutable**: Once created, events never change
//! 2. **Events are past tense**: Named for what happened (Planned, not Plan)
//! 3. **Events carry identity**: event_id, release_id and timestamp on every variant
//! 4. **Events are delivered once**: the aggregate buffer is drained, never replayed
//!
//! # Event Flow
//!
//! ```text
//! Transition → Aggregate buffer → flush_events() → EventPublisher
//!  (validate)      (append)          (drain once)      (deliver)
//! ```

pub mod release;

pub use release::{
    DependencyVersionUpdated, PackageAdded, PackageNotesGenerated, PackagePublished,
    PackageVersionBumped, ReleaseApproved, ReleaseCanceled, ReleaseCreated, ReleaseEvent,
    ReleaseFailed, ReleaseNotesReady, ReleasePlanned, ReleasePublished, ReleasePublishing,
    ReleaseVersioned, VersionChange,
};
