// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hook executors
//!
//! Both executors resolve the plugins declaring a hook from the registry and
//! return one [`HookResult`] per matched plugin, in registration order. A
//! plugin error or panic never aborts the batch: it becomes a failed
//! response at the plugin's position.
//!
//! # Strategies
//!
//! ```text
//! Sequential:  p1 ──> p2 ──> p3            latency = Σ plugin latencies
//!
//! Parallel:    ┌─ p1 ─┐
//!              ├─ p2 ─┤──> join (index-aligned results)
//!              └─ p3 ─┘
//! ```
//!
//! Cancellation is cooperative: the context is checked once per plugin
//! before invoking it. A call already in flight is not interrupted, so a
//! slow plugin can outlive the caller's deadline unless it honours the
//! context itself.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, info, warn};

use super::context::ExecutionContext;
use super::hook::Hook;
use super::registry::{PluginRegistry, RegistryError};
use super::types::{ExecuteRequest, ExecuteResponse, PluginInstance, ReleaseContext};
use crate::domain::PluginId;

/// Executor errors (infrastructure problems, never plugin failures)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Targeted call to a plugin that does not declare the hook
    #[error("Plugin {plugin_id} does not support hook {hook}")]
    UnsupportedHook { plugin_id: PluginId, hook: Hook },
}

/// Outcome of one plugin for one hook
#[derive(Debug, Clone, PartialEq)]
pub struct HookResult {
    pub plugin_id: PluginId,
    pub response: ExecuteResponse,
}

/// Runs plugins for a hook
#[async_trait]
pub trait HookExecutor: Send + Sync {
    /// Run every plugin declaring `hook`
    async fn execute_hook(
        &self,
        ctx: &ExecutionContext,
        hook: Hook,
        release: &ReleaseContext,
    ) -> Result<Vec<HookResult>, ExecutorError>;

    /// Run a single plugin; the registry's stored config fills in a
    /// missing `request.config`
    async fn execute_plugin(
        &self,
        ctx: &ExecutionContext,
        id: &PluginId,
        request: ExecuteRequest,
    ) -> Result<ExecuteResponse, ExecutorError>;
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Invoke one plugin, folding its error or panic into a failed response
async fn invoke(
    instance: &PluginInstance,
    ctx: &ExecutionContext,
    mut request: ExecuteRequest,
) -> ExecuteResponse {
    if ctx.is_cancelled() {
        debug!(plugin_id = %instance.id, "Skipping plugin, context already done");
        return ExecuteResponse::failure(ctx.cancellation_reason());
    }

    if request.config.is_none() {
        request.config = instance.config.clone();
    }

    let hook = request.hook;
    let started = Instant::now();
    let call = AssertUnwindSafe(instance.plugin.execute(ctx, request)).catch_unwind();
    match call.await {
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(plugin_id = %instance.id, hook = %hook, panic = %message, "Plugin panicked");
            ExecuteResponse::failure(format!("plugin panicked: {}", message))
        }
        Ok(Ok(response)) => {
            debug!(
                plugin_id = %instance.id,
                hook = %hook,
                success = response.success,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Plugin finished"
            );
            response
        }
        Ok(Err(e)) => {
            warn!(plugin_id = %instance.id, hook = %hook, error = %e, "Plugin failed");
            ExecuteResponse::failure(e.to_string())
        }
    }
}

async fn execute_targeted(
    registry: &PluginRegistry,
    ctx: &ExecutionContext,
    id: &PluginId,
    request: ExecuteRequest,
) -> Result<ExecuteResponse, ExecutorError> {
    let instance = registry.get(id)?;
    if !instance.info.supports(request.hook) {
        return Err(ExecutorError::UnsupportedHook {
            plugin_id: id.clone(),
            hook: request.hook,
        });
    }
    Ok(invoke(&instance, ctx, request).await)
}

/// Runs matching plugins one after another
pub struct SequentialExecutor {
    registry: Arc<PluginRegistry>,
}

impl SequentialExecutor {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

#[async_trait]
impl HookExecutor for SequentialExecutor {
    async fn execute_hook(
        &self,
        ctx: &ExecutionContext,
        hook: Hook,
        release: &ReleaseContext,
    ) -> Result<Vec<HookResult>, ExecutorError> {
        let plugins = self.registry.get_by_hook(hook);
        let mut results = Vec::with_capacity(plugins.len());

        for instance in plugins {
            let request = ExecuteRequest::new(hook, release.clone());
            let response = invoke(&instance, ctx, request).await;
            results.push(HookResult {
                plugin_id: instance.id.clone(),
                response,
            });
        }

        info!(
            hook = %hook,
            plugins = results.len(),
            failed = results.iter().filter(|r| !r.response.success).count(),
            "Hook executed sequentially"
        );
        Ok(results)
    }

    async fn execute_plugin(
        &self,
        ctx: &ExecutionContext,
        id: &PluginId,
        request: ExecuteRequest,
    ) -> Result<ExecuteResponse, ExecutorError> {
        execute_targeted(&self.registry, ctx, id, request).await
    }
}

/// Runs matching plugins concurrently, one task per plugin
pub struct ParallelExecutor {
    registry: Arc<PluginRegistry>,
}

impl ParallelExecutor {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

#[async_trait]
impl HookExecutor for ParallelExecutor {
    async fn execute_hook(
        &self,
        ctx: &ExecutionContext,
        hook: Hook,
        release: &ReleaseContext,
    ) -> Result<Vec<HookResult>, ExecutorError> {
        let plugins = self.registry.get_by_hook(hook);

        let handles: Vec<_> = plugins
            .iter()
            .map(|instance| {
                let instance = Arc::clone(instance);
                let ctx = ctx.clone();
                let request = ExecuteRequest::new(hook, release.clone());
                tokio::spawn(async move { invoke(&instance, &ctx, request).await })
            })
            .collect();

        // join_all preserves input order, so result i belongs to plugin i.
        let results: Vec<HookResult> = join_all(handles)
            .await
            .into_iter()
            .zip(plugins.iter())
            .map(|(joined, instance)| {
                let response = joined.unwrap_or_else(|e| {
                    warn!(plugin_id = %instance.id, error = %e, "Plugin task aborted");
                    ExecuteResponse::failure(format!("plugin task aborted: {}", e))
                });
                HookResult {
                    plugin_id: instance.id.clone(),
                    response,
                }
            })
            .collect();

        info!(
            hook = %hook,
            plugins = results.len(),
            failed = results.iter().filter(|r| !r.response.success).count(),
            "Hook executed in parallel"
        );
        Ok(results)
    }

    async fn execute_plugin(
        &self,
        ctx: &ExecutionContext,
        id: &PluginId,
        request: ExecuteRequest,
    ) -> Result<ExecuteResponse, ExecutorError> {
        execute_targeted(&self.registry, ctx, id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReleaseAggregate;
    use crate::domain::ReleaseStrategy;
    use crate::plugin::types::{Plugin, PluginError, PluginInfo, ValidateResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoPlugin {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Plugin for EchoPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo::new("echo", "0.1.0", vec![Hook::PostPublish])
        }

        async fn execute(
            &self,
            _ctx: &ExecutionContext,
            request: ExecuteRequest,
        ) -> Result<ExecuteResponse, PluginError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PluginError::Execution("nope".to_string()));
            }
            let config = request.config.unwrap_or_default();
            Ok(ExecuteResponse::ok(format!("echo {}", config)))
        }

        async fn validate(
            &self,
            _config: &serde_json::Value,
        ) -> Result<ValidateResponse, PluginError> {
            Ok(ValidateResponse::valid())
        }
    }

    fn context() -> ReleaseContext {
        let release = ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Lockstep);
        ReleaseContext::from_release(&release, None, "v0.0.0")
    }

    fn registry_with(plugins: &[(&str, bool)]) -> (Arc<PluginRegistry>, Vec<Arc<EchoPlugin>>) {
        let registry = Arc::new(PluginRegistry::new());
        let mut handles = Vec::new();
        for (id, fail) in plugins {
            let plugin = Arc::new(EchoPlugin {
                calls: AtomicUsize::new(0),
                fail: *fail,
            });
            registry.register(*id, plugin.clone()).unwrap();
            handles.push(plugin);
        }
        (registry, handles)
    }

    #[tokio::test]
    async fn test_sequential_isolates_plugin_errors() {
        let (registry, _) = registry_with(&[("a", false), ("b", true), ("c", false)]);
        let executor = SequentialExecutor::new(registry);

        let results = executor
            .execute_hook(&ExecutionContext::new(), Hook::PostPublish, &context())
            .await
            .unwrap();

        let outcome: Vec<_> = results.iter().map(|r| r.response.success).collect();
        assert_eq!(outcome, vec![true, false, true]);
        assert_eq!(results[1].plugin_id, PluginId::new("b"));
    }

    #[tokio::test]
    async fn test_no_matching_plugins() {
        let (registry, _) = registry_with(&[("a", false)]);
        let executor = ParallelExecutor::new(registry);
        let results = executor
            .execute_hook(&ExecutionContext::new(), Hook::PrePlan, &context())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_execute_plugin_uses_stored_config() {
        let (registry, _) = registry_with(&[("a", false)]);
        let id = PluginId::new("a");
        registry
            .set_config(&id, serde_json::json!({"channel": "#releases"}))
            .unwrap();
        let executor = SequentialExecutor::new(registry);

        let response = executor
            .execute_plugin(
                &ExecutionContext::new(),
                &id,
                ExecuteRequest::new(Hook::PostPublish, context()),
            )
            .await
            .unwrap();
        assert!(response.message.contains("#releases"));
    }

    #[tokio::test]
    async fn test_execute_plugin_errors() {
        let (registry, _) = registry_with(&[("a", false)]);
        let executor = ParallelExecutor::new(registry);

        let missing = executor
            .execute_plugin(
                &ExecutionContext::new(),
                &PluginId::new("zzz"),
                ExecuteRequest::new(Hook::PostPublish, context()),
            )
            .await;
        assert!(matches!(missing, Err(ExecutorError::Registry(_))));

        let unsupported = executor
            .execute_plugin(
                &ExecutionContext::new(),
                &PluginId::new("a"),
                ExecuteRequest::new(Hook::PreInit, context()),
            )
            .await;
        assert!(matches!(
            unsupported,
            Err(ExecutorError::UnsupportedHook { .. })
        ));
    }

    #[tokio::test]
    async fn test_sequential_respects_cancellation() {
        let (registry, plugins) = registry_with(&[("a", false)]);
        let executor = SequentialExecutor::new(registry);
        let ctx = ExecutionContext::new();
        ctx.cancel();

        let results = executor
            .execute_hook(&ctx, Hook::PostPublish, &context())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].response.success);
        assert_eq!(plugins[0].calls.load(Ordering::SeqCst), 0);
    }
}
