// Copyright (c) 2025 - Cowboy AI, Inc.
//! Idempotent publish pipeline
//!
//! # Tag steps
//!
//! ```text
//! tag_exists? ──yes──> skip_push or on remote? ──yes──> success "already exists (idempotent)"
//!     │no                     │no
//!     │                   push_tag ──err──> TagPush (output "Created tag")
//!     │                       └──────────> success "Pushed existing tag"
//! create_tag ──err──> TagCreate (no output)
//!     │
//! skip_push? ──yes──> success "Created tag"
//!     │no
//! push_tag ───err──> TagPush (output still "Created tag")
//!     │
//! success "Created and pushed tag"
//! ```
//!
//! A tag counts as done only once it is on the remote (unless pushing is
//! disabled), so a run interrupted between create and push resumes with
//! the push.
//!
//! Every other step type is delegated to the plugins registered for the
//! step's hook. A failed plugin response fails the step softly
//! (`Ok(StepResult { success: false, .. })`); only infrastructure problems
//! are `Err`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::PipelineConfig;
use super::step::{Step, StepResult, StepType};
use super::tags::{TagCreator, TagError, TagLookup};
use crate::aggregate::{PackageRelease, ReleaseAggregate};
use crate::domain::ReleaseId;
use crate::plugin::{ExecutionContext, ExecutorError, HookExecutor, ReleaseContext};

/// Pipeline errors
///
/// `TagCreate` and `TagPush` carry the [`StepResult`] the driver must
/// persist before deciding what to retry.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No tag creator configured")]
    MissingTagCreator,

    #[error("No hook executor configured")]
    MissingExecutor,

    /// The step's package (or the release's primary package) is missing
    #[error("Release {release_id} has no target package{}", describe_path(.path))]
    NoTargetPackage {
        release_id: ReleaseId,
        path: Option<String>,
    },

    #[error("Tag lookup for {tag} failed: {source}")]
    TagLookup { tag: String, source: TagError },

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("Failed to create tag {tag}: {source}")]
    TagCreate {
        tag: String,
        result: StepResult,
        source: TagError,
    },

    #[error("Created tag {tag} but failed to push it: {source}")]
    TagPush {
        tag: String,
        result: StepResult,
        source: TagError,
    },
}

fn describe_path(path: &Option<String>) -> String {
    path.as_ref().map(|p| format!(" {}", p)).unwrap_or_default()
}

impl PipelineError {
    /// Result recorded before the failure, if any
    pub fn partial_result(&self) -> Option<&StepResult> {
        match self {
            Self::TagCreate { result, .. } | Self::TagPush { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Executes publish steps against a release
pub struct PublishPipeline {
    config: PipelineConfig,
    tags: Option<Arc<dyn TagCreator>>,
    lookup: Option<Arc<dyn TagLookup>>,
    executor: Option<Arc<dyn HookExecutor>>,
}

impl PublishPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            tags: None,
            lookup: None,
            executor: None,
        }
    }

    pub fn with_tag_creator(mut self, tags: Arc<dyn TagCreator>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_tag_lookup(mut self, lookup: Arc<dyn TagLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn HookExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn executor(&self) -> Option<&Arc<dyn HookExecutor>> {
        self.executor.as_ref()
    }

    /// Run one step
    pub async fn execute_step(
        &self,
        ctx: &ExecutionContext,
        release: &ReleaseAggregate,
        step: &Step,
    ) -> Result<StepResult, PipelineError> {
        debug!(
            release_id = %release.id(),
            step = %step.name,
            step_type = %step.step_type,
            "Executing publish step"
        );
        match step.step_type {
            StepType::Tag => self.execute_tag_step(ctx, release, step).await,
            _ => self.execute_plugin_step(ctx, release, step).await,
        }
    }

    /// Whether the step's effect is already present
    ///
    /// A tag step is done when the tag exists locally and, unless pushing
    /// is disabled, on the remote. Every other step type reports `false`
    /// and relies on its plugins for idempotency.
    pub async fn check_idempotency(
        &self,
        ctx: &ExecutionContext,
        release: &ReleaseAggregate,
        step: &Step,
    ) -> Result<bool, PipelineError> {
        if step.step_type != StepType::Tag {
            return Ok(false);
        }

        let (_, tag) = self.resolve_tag(release, step)?;
        let found = match (&self.lookup, &self.tags) {
            (Some(lookup), _) => lookup.find_tag(ctx, &tag).await,
            (None, Some(tags)) => tags.tag_exists(ctx, &tag).await,
            (None, None) => return Err(PipelineError::MissingTagCreator),
        };
        let found = found.map_err(|source| PipelineError::TagLookup {
            tag: tag.clone(),
            source,
        })?;
        if !found || self.config.skip_push {
            return Ok(found);
        }

        let tags = self.tags.as_ref().ok_or(PipelineError::MissingTagCreator)?;
        self.is_pushed(ctx, tags.as_ref(), &tag).await
    }

    async fn is_pushed(
        &self,
        ctx: &ExecutionContext,
        tags: &dyn TagCreator,
        tag: &str,
    ) -> Result<bool, PipelineError> {
        tags.remote_tag_exists(ctx, tag, &self.config.remote)
            .await
            .map_err(|source| PipelineError::TagLookup {
                tag: tag.to_string(),
                source,
            })
    }

    async fn push(
        &self,
        ctx: &ExecutionContext,
        tags: &dyn TagCreator,
        release: &ReleaseAggregate,
        tag: String,
    ) -> Result<(), PipelineError> {
        if let Err(source) = tags.push_tag(ctx, &tag, &self.config.remote).await {
            warn!(
                release_id = %release.id(),
                tag = %tag,
                remote = %self.config.remote,
                error = %source,
                "Tag push failed"
            );
            return Err(PipelineError::TagPush {
                result: StepResult::partial(format!("Created tag {}", tag), source.to_string()),
                tag,
                source,
            });
        }
        Ok(())
    }

    async fn execute_tag_step(
        &self,
        ctx: &ExecutionContext,
        release: &ReleaseAggregate,
        step: &Step,
    ) -> Result<StepResult, PipelineError> {
        let tags = self.tags.as_ref().ok_or(PipelineError::MissingTagCreator)?;
        let (package, tag) = self.resolve_tag(release, step)?;

        let exists = tags
            .tag_exists(ctx, &tag)
            .await
            .map_err(|source| PipelineError::TagLookup {
                tag: tag.clone(),
                source,
            })?;
        if exists {
            if self.config.skip_push || self.is_pushed(ctx, tags.as_ref(), &tag).await? {
                info!(release_id = %release.id(), tag = %tag, "Tag already exists, nothing to do");
                return Ok(StepResult::succeeded(format!(
                    "Tag {} already exists (idempotent)",
                    tag
                )));
            }

            self.push(ctx, tags.as_ref(), release, tag.clone()).await?;
            info!(
                release_id = %release.id(),
                tag = %tag,
                remote = %self.config.remote,
                "Pushed tag left behind by an earlier run"
            );
            return Ok(StepResult::succeeded(format!("Pushed existing tag {}", tag)));
        }

        let message = tag_message(package, &tag);
        if let Err(source) = tags.create_tag(ctx, &tag, &message).await {
            warn!(release_id = %release.id(), tag = %tag, error = %source, "Tag creation failed");
            return Err(PipelineError::TagCreate {
                result: StepResult::failed(source.to_string()),
                tag,
                source,
            });
        }

        if self.config.skip_push {
            info!(release_id = %release.id(), tag = %tag, "Created tag, push skipped");
            return Ok(StepResult::succeeded(format!("Created tag {}", tag)));
        }

        self.push(ctx, tags.as_ref(), release, tag.clone()).await?;

        info!(release_id = %release.id(), tag = %tag, remote = %self.config.remote, "Created and pushed tag");
        Ok(StepResult::succeeded(format!("Created and pushed tag {}", tag)))
    }

    async fn execute_plugin_step(
        &self,
        ctx: &ExecutionContext,
        release: &ReleaseAggregate,
        step: &Step,
    ) -> Result<StepResult, PipelineError> {
        let executor = self
            .executor
            .as_ref()
            .ok_or(PipelineError::MissingExecutor)?;

        let package = self.target_package(release, step)?;
        let tag = step
            .tag_name
            .clone()
            .or_else(|| package.map(|p| p.resolve_tag_name(&self.config.tag_prefix)))
            .unwrap_or_default();
        let release_ctx = ReleaseContext::from_release(release, package, tag)
            .with_repository_path(self.config.repository_path.clone());

        let hook = step.step_type.hook();
        let results = executor.execute_hook(ctx, hook, &release_ctx).await?;

        let mut outputs = Vec::with_capacity(results.len());
        for result in &results {
            if !result.response.success {
                let reason = result
                    .response
                    .error
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| result.response.message.clone());
                warn!(
                    release_id = %release.id(),
                    step = %step.name,
                    plugin_id = %result.plugin_id,
                    error = %reason,
                    "Publish step failed"
                );
                return Ok(StepResult::partial(
                    outputs.join("\n"),
                    format!("plugin {}: {}", result.plugin_id, reason),
                ));
            }
            if !result.response.message.is_empty() {
                outputs.push(result.response.message.clone());
            }
        }

        info!(
            release_id = %release.id(),
            step = %step.name,
            hook = %hook,
            plugins = results.len(),
            "Publish step succeeded"
        );
        Ok(StepResult::succeeded(outputs.join("\n")))
    }

    /// Package named by the step, or the primary package when none is named
    fn target_package<'a>(
        &self,
        release: &'a ReleaseAggregate,
        step: &Step,
    ) -> Result<Option<&'a PackageRelease>, PipelineError> {
        match &step.package_path {
            Some(path) => release
                .package(path)
                .map(Some)
                .ok_or_else(|| PipelineError::NoTargetPackage {
                    release_id: release.id(),
                    path: Some(path.clone()),
                }),
            None => Ok(release.primary_package()),
        }
    }

    /// Explicit tag, else the target package's tag name
    fn resolve_tag<'a>(
        &self,
        release: &'a ReleaseAggregate,
        step: &Step,
    ) -> Result<(Option<&'a PackageRelease>, String), PipelineError> {
        let package = self.target_package(release, step)?;
        let tag = match (&step.tag_name, package) {
            (Some(tag), _) => tag.clone(),
            (None, Some(package)) => package.resolve_tag_name(&self.config.tag_prefix),
            (None, None) => {
                return Err(PipelineError::NoTargetPackage {
                    release_id: release.id(),
                    path: None,
                })
            }
        };
        Ok((package, tag))
    }
}

/// `Release <version>`, followed by the package notes when present
fn tag_message(package: Option<&PackageRelease>, tag: &str) -> String {
    match package {
        Some(package) if !package.notes().is_empty() => {
            format!("Release {}\n\n{}", package.next_version(), package.notes())
        }
        Some(package) => format!("Release {}", package.next_version()),
        None => format!("Release {}", tag),
    }
}
