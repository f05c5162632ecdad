// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Aggregate
//!
//! This module provides the release aggregate root and its package
//! sub-entities:
//! - Every transition validates before mutating
//! - Every accepted transition appends a domain event to an owned buffer
//! - The buffer is drained exactly once per flush
//!
//! # Lifecycle
//!
//! ```text
//! create → add_package* → plan → set_package_version* → set_versions
//!        → set_package_notes* → generate_notes → approve → start_publish
//!        → complete
//! ```
//!
//! `fail` and `cancel` are accepted from any non-terminal state.
//!
//! # Example Usage
//!
//! ```rust
//! use cim_release::aggregate::{PackageRelease, ReleaseAggregate};
//! use cim_release::domain::{BumpType, PackageType, ReleaseState, ReleaseStrategy, SemanticVersion};
//!
//! let mut release = ReleaseAggregate::create("github.com/o/r", "v1.0.0", "HEAD", ReleaseStrategy::Independent);
//! release.add_package(PackageRelease::new("core", "core", PackageType::Cargo, SemanticVersion::new(1, 0, 0)))?;
//! release.plan()?;
//! release.set_package_version("core", SemanticVersion::new(1, 1, 0), BumpType::Minor)?;
//! release.set_versions()?;
//! release.generate_notes()?;
//! release.approve("alice")?;
//! release.start_publish()?;
//! release.complete()?;
//!
//! assert_eq!(release.state(), ReleaseState::Published);
//! let events = release.flush_events();
//! assert!(release.flush_events().is_empty());
//! # assert!(!events.is_empty());
//! # Ok::<(), cim_release::aggregate::ReleaseError>(())
//! ```

pub mod package;
pub mod release;

pub use package::{PackageError, PackageRelease};
pub use release::{ReleaseAggregate, ReleaseError, ReleaseResult};
