// Copyright (c) 2025 - Cowboy AI, Inc.
//! Publish steps and their results

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::plugin::Hook;

/// Kind of work a publish step performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Tag,
    Build,
    Artifact,
    Notify,
    Plugin,
    Changelog,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Build => "build",
            Self::Artifact => "artifact",
            Self::Notify => "notify",
            Self::Plugin => "plugin",
            Self::Changelog => "changelog",
        }
    }

    /// Hook whose plugins carry out a non-tag step
    ///
    /// Tag steps are handled by the pipeline itself; their mapping only
    /// matters for plugins that observe tagging.
    pub fn hook(&self) -> Hook {
        match self {
            Self::Tag | Self::Build => Hook::PostVersion,
            Self::Artifact | Self::Notify | Self::Plugin => Hook::PostPublish,
            Self::Changelog => Hook::PostNotes,
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of publish work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub step_type: StepType,

    /// Package the step targets; the release's primary package when absent
    #[serde(default)]
    pub package_path: Option<String>,

    /// Explicit tag name for tag steps
    #[serde(default)]
    pub tag_name: Option<String>,
}

impl Step {
    pub fn new(name: impl Into<String>, step_type: StepType) -> Self {
        Self {
            name: name.into(),
            step_type,
            package_path: None,
            tag_name: None,
        }
    }

    /// Tag step named `tag`
    pub fn tag() -> Self {
        Self::new("tag", StepType::Tag)
    }

    pub fn for_package(mut self, path: impl Into<String>) -> Self {
        self.package_path = Some(path.into());
        self
    }

    pub fn with_tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }
}

/// Outcome of one step; persisted by the driver before deciding to retry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl StepResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Failure that still records progress made before the error
    pub fn partial(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }
}
