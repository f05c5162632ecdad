// Copyright (c) 2025 - Cowboy AI, Inc.
//! Publish pipeline configuration

use serde::{Deserialize, Serialize};

/// Publish pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Create tags locally without pushing them
    pub skip_push: bool,

    /// Remote tags are pushed to
    pub remote: String,

    /// Prefix for derived tag names (`v` gives `v1.2.3`)
    pub tag_prefix: String,

    /// Repository checkout handed to plugins
    pub repository_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_push: false,
            remote: "origin".to_string(),
            tag_prefix: "v".to_string(),
            repository_path: ".".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Read `RELEASE_SKIP_PUSH`, `RELEASE_GIT_REMOTE`, `RELEASE_TAG_PREFIX`
    /// and `RELEASE_REPOSITORY_PATH`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            skip_push: std::env::var("RELEASE_SKIP_PUSH")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.skip_push),
            remote: std::env::var("RELEASE_GIT_REMOTE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.remote),
            tag_prefix: std::env::var("RELEASE_TAG_PREFIX").unwrap_or(defaults.tag_prefix),
            repository_path: std::env::var("RELEASE_REPOSITORY_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.repository_path),
        }
    }

    pub fn with_skip_push(mut self, skip_push: bool) -> Self {
        self.skip_push = skip_push;
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_repository_path(mut self, path: impl Into<String>) -> Self {
        self.repository_path = path.into();
        self
    }

    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
