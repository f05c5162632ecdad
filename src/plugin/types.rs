// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin contract types
//!
//! Request/response shapes exchanged with plugins and the [`Plugin`] trait
//! every backend (in-process, RPC-hosted) implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::context::ExecutionContext;
use super::hook::Hook;
use crate::aggregate::{PackageRelease, ReleaseAggregate};
use crate::domain::{BumpType, PluginId, ReleaseId, SemanticVersion};

/// Static description of a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: Option<String>,

    /// Hooks this plugin wants to run at
    pub hooks: Vec<Hook>,

    /// JSON schema for the plugin's configuration
    #[serde(default)]
    pub config_schema: Option<serde_json::Value>,
}

impl PluginInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>, hooks: Vec<Hook>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: None,
            hooks,
            config_schema: None,
        }
    }

    pub fn supports(&self, hook: Hook) -> bool {
        self.hooks.contains(&hook)
    }
}

/// Runtime state of a registered plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    Loading,
    #[default]
    Ready,
    Error,
    Disabled,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Disabled => "disabled",
        };
        write!(f, "{}", name)
    }
}

/// Changes attached to one package in the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChanges {
    pub path: String,
    pub name: String,
    pub bump: BumpType,
    pub next_version: SemanticVersion,
    pub changed_files: Vec<String>,
    pub commit_count: u32,
}

impl From<&PackageRelease> for PackageChanges {
    fn from(package: &PackageRelease) -> Self {
        Self {
            path: package.path().to_string(),
            name: package.name().to_string(),
            bump: package.bump(),
            next_version: package.next_version().clone(),
            changed_files: package.changed_files().to_vec(),
            commit_count: package.commit_count(),
        }
    }
}

/// Snapshot of a release handed to plugins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseContext {
    pub release_id: ReleaseId,
    pub repo_id: String,

    /// Local path of the repository checkout
    pub repository_path: String,
    pub base_ref: String,
    pub head_ref: String,

    pub version: SemanticVersion,
    pub previous_version: SemanticVersion,
    pub release_type: BumpType,
    pub tag_name: String,

    pub changelog: String,
    pub release_notes: String,

    /// Changes per releasable package
    pub changeset: Vec<PackageChanges>,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl ReleaseContext {
    /// Build a snapshot of `release`, focused on `package`
    ///
    /// Version, tag and notes come from the focused package; the changeset
    /// covers every included or released package.
    pub fn from_release(
        release: &ReleaseAggregate,
        package: Option<&PackageRelease>,
        tag_name: impl Into<String>,
    ) -> Self {
        let changeset: Vec<PackageChanges> = release
            .packages()
            .iter()
            .filter(|p| p.state().is_releasable())
            .map(PackageChanges::from)
            .collect();

        let changelog = release
            .packages()
            .iter()
            .filter(|p| p.state().is_releasable() && !p.notes().is_empty())
            .map(|p| format!("## {} {}\n\n{}", p.name(), p.next_version(), p.notes()))
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            release_id: release.id(),
            repo_id: release.repo_id().to_string(),
            repository_path: ".".to_string(),
            base_ref: release.base_ref().to_string(),
            head_ref: release.head_ref().to_string(),
            version: package
                .map(|p| p.next_version().clone())
                .unwrap_or_default(),
            previous_version: package
                .map(|p| p.current_version().clone())
                .unwrap_or_default(),
            release_type: package.map(PackageRelease::bump).unwrap_or_default(),
            tag_name: tag_name.into(),
            changelog,
            release_notes: package.map(|p| p.notes().to_string()).unwrap_or_default(),
            changeset,
            dry_run: false,
            environment: BTreeMap::new(),
        }
    }

    pub fn with_repository_path(mut self, path: impl Into<String>) -> Self {
        self.repository_path = path.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Request sent to a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub hook: Hook,
    pub context: ReleaseContext,

    /// Plugin configuration; the registry's stored config is used when absent
    #[serde(default)]
    pub config: Option<serde_json::Value>,

    #[serde(default)]
    pub dry_run: bool,
}

impl ExecuteRequest {
    pub fn new(hook: Hook, context: ReleaseContext) -> Self {
        let dry_run = context.dry_run;
        Self {
            hook,
            context,
            config: None,
            dry_run,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Plugin response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub outputs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl ExecuteResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
            outputs: BTreeMap::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: String::new(),
            error: Some(error.into()),
            outputs: BTreeMap::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }

    /// Message, falling back to the error text
    pub fn summary(&self) -> &str {
        if self.message.is_empty() {
            self.error.as_deref().unwrap_or_default()
        } else {
            &self.message
        }
    }
}

/// One configuration problem reported by [`Plugin::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

/// Result of validating a plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ConfigIssue>,
}

impl ValidateResponse {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<ConfigIssue>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Errors a plugin implementation may return
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin execution failed: {0}")]
    Execution(String),

    #[error("Invalid plugin configuration: {0}")]
    InvalidConfig(String),

    #[error("Plugin transport error: {0}")]
    Transport(String),
}

/// Plugin capability set
///
/// Implementations must be cheap to share (`Arc`) and safe to call from
/// several tasks at once.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Static plugin description, including supported hooks
    fn info(&self) -> PluginInfo;

    /// Run the plugin for one hook
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        request: ExecuteRequest,
    ) -> Result<ExecuteResponse, PluginError>;

    /// Check a configuration without running anything
    async fn validate(&self, config: &serde_json::Value) -> Result<ValidateResponse, PluginError>;
}

/// A plugin as held by the registry
#[derive(Clone)]
pub struct PluginInstance {
    pub id: PluginId,
    pub plugin: Arc<dyn Plugin>,
    pub info: PluginInfo,
    pub state: PluginState,
    pub error: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub config: Option<serde_json::Value>,
}

impl PluginInstance {
    pub fn new(id: PluginId, plugin: Arc<dyn Plugin>) -> Self {
        let info = plugin.info();
        Self {
            id,
            plugin,
            info,
            state: PluginState::Ready,
            error: None,
            loaded_at: Utc::now(),
            config: None,
        }
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("state", &self.state)
            .field("error", &self.error)
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}
