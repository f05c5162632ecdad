// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Service
//!
//! Each call is one unit of work:
//!
//! ```text
//! load → mutate aggregate → save → flush_events → EventPublisher
//! ```
//!
//! A rejected mutation leaves nothing saved and nothing published. Calls on
//! the same release must not overlap; the service holds no lock of its own.
//!
//! # Publishing
//!
//! ```text
//! Approved ──start_publish──> Publishing
//!   for each step:
//!     check_idempotency ──done──> skip
//!     execute_step ──failed──> fail(reason), on-error hook, stop
//!   complete(), on-success hook
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{PackageRelease, ReleaseAggregate, ReleaseError};
use crate::domain::{ReleaseId, ReleaseState, ReleaseStrategy};
use crate::plugin::{ExecutionContext, Hook, ReleaseContext};
use crate::ports::{EventPublisher, PublishError, ReleaseRepository, RepositoryError};
use crate::publish::{PublishPipeline, Step, StepResult, StepType};

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Event publishing failed: {0}")]
    Publish(#[from] PublishError),

    /// Repository already has a release in flight
    #[error("Repository {repo_id} already has active release {release_id}")]
    ActiveReleaseExists {
        repo_id: String,
        release_id: ReleaseId,
    },

    #[error("No publish pipeline configured")]
    MissingPipeline,
}

/// What happened to one step during [`ReleaseService::publish`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub name: String,
    pub step_type: StepType,
    pub result: StepResult,
    /// The step's effect was already present and it was not run
    pub skipped: bool,
}

/// Summary of a publish run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub release_id: ReleaseId,
    pub state: ReleaseState,
    pub steps: Vec<StepOutcome>,
    pub failure: Option<String>,
}

impl PublishReport {
    pub fn succeeded(&self) -> bool {
        self.state == ReleaseState::Published
    }

    pub fn skipped(&self) -> usize {
        self.steps.iter().filter(|s| s.skipped).count()
    }
}

/// Release application service
pub struct ReleaseService<R, P> {
    repository: Arc<R>,
    publisher: Arc<P>,
    pipeline: Option<PublishPipeline>,
}

impl<R, P> ReleaseService<R, P>
where
    R: ReleaseRepository,
    P: EventPublisher,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            publisher,
            pipeline: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: PublishPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Start a release for `repo_id` with its initial packages
    ///
    /// Refused while the repository has a non-terminal release.
    pub async fn create_release(
        &self,
        repo_id: &str,
        base_ref: &str,
        head_ref: &str,
        strategy: ReleaseStrategy,
        packages: Vec<PackageRelease>,
    ) -> ServiceResult<ReleaseAggregate> {
        match self.repository.find_active(repo_id).await {
            Ok(active) => {
                return Err(ServiceError::ActiveReleaseExists {
                    repo_id: repo_id.to_string(),
                    release_id: active.id(),
                })
            }
            Err(RepositoryError::NoActiveRelease(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let mut release = ReleaseAggregate::create(repo_id, base_ref, head_ref, strategy);
        for package in packages {
            release.add_package(package)?;
        }

        self.persist(&mut release).await?;
        info!(
            release_id = %release.id(),
            repo_id = %repo_id,
            packages = release.package_count(),
            "Release created"
        );
        Ok(release)
    }

    pub async fn get(&self, id: ReleaseId) -> ServiceResult<ReleaseAggregate> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Load, apply `command`, save and publish the resulting events
    pub async fn execute<T, F>(&self, id: ReleaseId, command: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut ReleaseAggregate) -> Result<T, ReleaseError> + Send,
        T: Send,
    {
        let mut release = self.repository.find_by_id(id).await?;
        let output = command(&mut release)?;
        self.persist(&mut release).await?;
        Ok(output)
    }

    /// Run `steps` against an Approved (or already Publishing) release
    ///
    /// Step failures end the release in Failed and are reported, not
    /// returned as errors. Errors are reserved for loading, saving and
    /// event delivery.
    pub async fn publish(
        &self,
        ctx: &ExecutionContext,
        id: ReleaseId,
        steps: &[Step],
    ) -> ServiceResult<PublishReport> {
        let pipeline = self.pipeline.as_ref().ok_or(ServiceError::MissingPipeline)?;
        let mut release = self.repository.find_by_id(id).await?;

        if release.state() != ReleaseState::Publishing {
            release.start_publish()?;
            self.persist(&mut release).await?;
        }

        let mut outcomes = Vec::with_capacity(steps.len());
        let mut failure = None;

        for step in steps {
            if ctx.is_cancelled() {
                failure = Some(ctx.cancellation_reason().to_string());
                break;
            }

            match pipeline.check_idempotency(ctx, &release, step).await {
                Ok(true) => {
                    info!(release_id = %id, step = %step.name, "Step already applied, skipping");
                    outcomes.push(StepOutcome {
                        name: step.name.clone(),
                        step_type: step.step_type,
                        result: StepResult::succeeded("already applied"),
                        skipped: true,
                    });
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    failure = Some(format!("step {} failed: {}", step.name, e));
                    outcomes.push(outcome(step, StepResult::failed(e.to_string())));
                    break;
                }
            }

            let result = match pipeline.execute_step(ctx, &release, step).await {
                Ok(result) => result,
                Err(e) => {
                    let result = e
                        .partial_result()
                        .cloned()
                        .unwrap_or_else(|| StepResult::failed(e.to_string()));
                    warn!(release_id = %id, step = %step.name, error = %e, "Publish step errored");
                    result
                }
            };

            let succeeded = result.success;
            if !succeeded {
                let reason = result.error.clone().unwrap_or_default();
                failure = Some(format!("step {} failed: {}", step.name, reason));
            }
            outcomes.push(outcome(step, result));
            if !succeeded {
                break;
            }
        }

        match &failure {
            Some(reason) => {
                release.fail(reason.clone())?;
                self.persist(&mut release).await?;
                warn!(release_id = %id, reason = %reason, "Release failed during publish");
                self.run_lifecycle_hook(ctx, pipeline, &release, Hook::OnError)
                    .await;
            }
            None => {
                release.complete()?;
                self.persist(&mut release).await?;
                info!(release_id = %id, steps = outcomes.len(), "Release published");
                self.run_lifecycle_hook(ctx, pipeline, &release, Hook::OnSuccess)
                    .await;
            }
        }

        Ok(PublishReport {
            release_id: id,
            state: release.state(),
            steps: outcomes,
            failure,
        })
    }

    /// Save the aggregate, then deliver its drained events
    async fn persist(&self, release: &mut ReleaseAggregate) -> ServiceResult<()> {
        self.repository.save(release).await?;
        let events = release.flush_events();
        if !events.is_empty() {
            self.publisher.publish(&events).await?;
        }
        Ok(())
    }

    /// Fire `on-success`/`on-error`; plugin failures here are logged only
    async fn run_lifecycle_hook(
        &self,
        ctx: &ExecutionContext,
        pipeline: &PublishPipeline,
        release: &ReleaseAggregate,
        hook: Hook,
    ) {
        let Some(executor) = pipeline.executor() else {
            return;
        };

        let primary = release.primary_package();
        let tag = primary
            .map(|p| p.resolve_tag_name(&pipeline.config().tag_prefix))
            .unwrap_or_default();
        let release_ctx = ReleaseContext::from_release(release, primary, tag)
            .with_repository_path(pipeline.config().repository_path.clone());

        match executor.execute_hook(ctx, hook, &release_ctx).await {
            Ok(results) => {
                for failed in results.iter().filter(|r| !r.response.success) {
                    warn!(
                        release_id = %release.id(),
                        hook = %hook,
                        plugin_id = %failed.plugin_id,
                        error = %failed.response.summary(),
                        "Lifecycle hook plugin failed"
                    );
                }
            }
            Err(e) => {
                warn!(release_id = %release.id(), hook = %hook, error = %e, "Lifecycle hook failed");
            }
        }
    }
}

fn outcome(step: &Step, result: StepResult) -> StepOutcome {
    StepOutcome {
        name: step.name.clone(),
        step_type: step.step_type,
        result,
        skipped: false,
    }
}
