// Copyright (c) 2025 - Cowboy AI, Inc.
//! Package Type Domain Model
//!
//! Defines the set of package ecosystems a release can contain. The type is
//! only a selector: version-file readers and writers for each ecosystem live
//! outside this crate and pick their strategy from this value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Package ecosystem taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    /// npm / Node.js package (`package.json`)
    Npm,
    /// Rust crate (`Cargo.toml`)
    Cargo,
    /// Python package (`pyproject.toml`, `setup.py`)
    Python,
    /// Go module (`go.mod`)
    GoModule,
    /// Maven project (`pom.xml`)
    Maven,
    /// Gradle project (`build.gradle`)
    Gradle,
    /// PHP Composer package (`composer.json`)
    Composer,
    /// Ruby gem (`*.gemspec`)
    Gem,
    /// .NET NuGet package (`*.csproj`)
    Nuget,
    /// Plain directory without a manifest
    Directory,
}

impl PackageType {
    /// All known package types
    pub const ALL: [PackageType; 10] = [
        Self::Npm,
        Self::Cargo,
        Self::Python,
        Self::GoModule,
        Self::Maven,
        Self::Gradle,
        Self::Composer,
        Self::Gem,
        Self::Nuget,
        Self::Directory,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Cargo => "cargo",
            Self::Python => "python",
            Self::GoModule => "go-module",
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Composer => "composer",
            Self::Gem => "gem",
            Self::Nuget => "nuget",
            Self::Directory => "directory",
        }
    }

    /// Parse from string representation, accepting common aliases
    ///
    /// Unrecognised names fall back to [`PackageType::Directory`].
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "npm" | "node" | "javascript" | "typescript" => Self::Npm,
            "cargo" | "rust" | "crate" => Self::Cargo,
            "python" | "pypi" | "pip" => Self::Python,
            "go-module" | "go" | "gomod" => Self::GoModule,
            "maven" | "mvn" => Self::Maven,
            "gradle" => Self::Gradle,
            "composer" | "php" => Self::Composer,
            "gem" | "ruby" | "rubygems" => Self::Gem,
            "nuget" | "dotnet" | ".net" => Self::Nuget,
            _ => Self::Directory,
        }
    }

    /// Primary manifest file that carries the version, if any
    pub fn manifest_file(&self) -> Option<&'static str> {
        match self {
            Self::Npm => Some("package.json"),
            Self::Cargo => Some("Cargo.toml"),
            Self::Python => Some("pyproject.toml"),
            Self::GoModule => Some("go.mod"),
            Self::Maven => Some("pom.xml"),
            Self::Gradle => Some("build.gradle"),
            Self::Composer => Some("composer.json"),
            Self::Gem | Self::Nuget | Self::Directory => None,
        }
    }

    /// Whether the version lives only in git tags (no manifest field)
    pub fn is_tag_versioned(&self) -> bool {
        matches!(self, Self::GoModule | Self::Directory)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
