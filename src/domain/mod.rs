// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Domain Models
//!
//! Value objects shared by the release aggregate, the plugin runtime and the
//! publish pipeline.
//!
//! # Value Objects
//!
//! - [`SemanticVersion`] - semver triple with prerelease/build metadata
//! - [`BumpType`] - none, patch, minor, major
//! - [`PackageType`] - package ecosystem selector
//! - [`ReleaseStrategy`] - independent, lockstep or hybrid versioning
//! - [`ReleaseId`] / [`PluginId`] - identities
//! - [`ReleaseState`] / [`PackageState`] - lifecycle states

pub mod identity;
pub mod lifecycle;
pub mod package_type;
pub mod strategy;
pub mod version;

pub use identity::{PluginId, ReleaseId};
pub use lifecycle::{PackageState, ReleaseState};
pub use package_type::PackageType;
pub use strategy::ReleaseStrategy;
pub use version::{calculate_next_version, BumpType, SemanticVersion, VersionError};
