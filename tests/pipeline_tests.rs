// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for the publish pipeline

mod fixtures;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use test_case::test_case;

use cim_release::plugin::{ExecutionContext, Hook, PluginRegistry, SequentialExecutor};
use cim_release::publish::{
    PipelineConfig, PipelineError, PublishPipeline, Step, StepResult, StepType,
};

use fixtures::*;

fn tag_pipeline(tags: Arc<ScriptedTags>, config: PipelineConfig) -> PublishPipeline {
    PublishPipeline::new(config).with_tag_creator(tags)
}

fn plugin_pipeline(plugins: &[Arc<CountingPlugin>]) -> PublishPipeline {
    let registry = Arc::new(PluginRegistry::new());
    for plugin in plugins {
        registry.register(plugin.name, plugin.clone()).unwrap();
    }
    PublishPipeline::new(PipelineConfig::default())
        .with_executor(Arc::new(SequentialExecutor::new(registry)))
}

#[tokio::test]
async fn test_tag_step_is_idempotent_across_runs() {
    let tags = shared(ScriptedTags::new());
    let pipeline = tag_pipeline(tags.clone(), PipelineConfig::default());
    let release = publishing_release();
    let ctx = ExecutionContext::new();

    let first = pipeline
        .execute_step(&ctx, &release, &Step::tag())
        .await
        .unwrap();
    assert_eq!(first, StepResult::succeeded("Created and pushed tag v1.1.0"));

    let second = pipeline
        .execute_step(&ctx, &release, &Step::tag())
        .await
        .unwrap();
    assert!(second.success);
    assert!(second.output.contains("already exists"), "{}", second.output);

    assert_eq!(tags.create_calls(), 1);
    assert_eq!(tags.push_calls(), 1);
}

#[tokio::test]
async fn test_tag_message_carries_version_and_notes() {
    let tags = shared(ScriptedTags::new());
    let pipeline = tag_pipeline(tags.clone(), PipelineConfig::default());

    pipeline
        .execute_step(&ExecutionContext::new(), &publishing_release(), &Step::tag())
        .await
        .unwrap();

    let messages = tags.messages.lock().unwrap().clone();
    assert_eq!(messages, vec!["Release 1.1.0\n\n- Faster builds".to_string()]);
}

#[tokio::test]
async fn test_push_failure_keeps_partial_progress() {
    let tags = shared(ScriptedTags::failing_push());
    let pipeline = tag_pipeline(tags.clone(), PipelineConfig::default());
    let release = publishing_release();

    let err = pipeline
        .execute_step(&ExecutionContext::new(), &release, &Step::tag())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::TagPush { .. }));
    let partial = err.partial_result().unwrap();
    assert!(!partial.success);
    assert_eq!(partial.output, "Created tag v1.1.0");
    assert!(tags.has_tag("v1.1.0"));

    // A local tag that never reached the remote is not done yet.
    let ctx = ExecutionContext::new();
    let done = pipeline
        .check_idempotency(&ctx, &release, &Step::tag())
        .await
        .unwrap();
    assert!(!done);

    let still_failing = pipeline
        .execute_step(&ctx, &release, &Step::tag())
        .await
        .unwrap_err();
    assert!(matches!(still_failing, PipelineError::TagPush { .. }));

    tags.heal_push();
    let retried = pipeline
        .execute_step(&ctx, &release, &Step::tag())
        .await
        .unwrap();
    assert_eq!(retried, StepResult::succeeded("Pushed existing tag v1.1.0"));
    assert_eq!(tags.create_calls(), 1);
    assert_eq!(tags.push_calls(), 3);
    assert!(tags.is_pushed("v1.1.0"));
    assert!(pipeline
        .check_idempotency(&ctx, &release, &Step::tag())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_local_tag_is_enough_when_push_is_skipped() {
    let tags = shared(ScriptedTags::new().with_local_tag("v1.1.0"));
    let pipeline = tag_pipeline(
        tags.clone(),
        PipelineConfig::default().with_skip_push(true),
    );
    let release = publishing_release();
    let ctx = ExecutionContext::new();

    assert!(pipeline
        .check_idempotency(&ctx, &release, &Step::tag())
        .await
        .unwrap());
    let result = pipeline
        .execute_step(&ctx, &release, &Step::tag())
        .await
        .unwrap();
    assert_eq!(
        result,
        StepResult::succeeded("Tag v1.1.0 already exists (idempotent)")
    );
    assert_eq!(tags.create_calls(), 0);
    assert_eq!(tags.push_calls(), 0);
}

#[tokio::test]
async fn test_create_failure_records_no_output() {
    let tags = shared(ScriptedTags::failing_create());
    let pipeline = tag_pipeline(tags.clone(), PipelineConfig::default());

    let err = pipeline
        .execute_step(&ExecutionContext::new(), &publishing_release(), &Step::tag())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::TagCreate { .. }));
    assert_eq!(err.partial_result().unwrap().output, "");
    assert_eq!(tags.push_calls(), 0);
}

#[tokio::test]
async fn test_skip_push_only_creates() {
    let tags = shared(ScriptedTags::new());
    let pipeline = tag_pipeline(
        tags.clone(),
        PipelineConfig::default().with_skip_push(true),
    );

    let result = pipeline
        .execute_step(&ExecutionContext::new(), &publishing_release(), &Step::tag())
        .await
        .unwrap();

    assert_eq!(result, StepResult::succeeded("Created tag v1.1.0"));
    assert_eq!(tags.push_calls(), 0);
}

#[tokio::test]
async fn test_tag_prefix_and_explicit_name() {
    let tags = shared(ScriptedTags::new());
    let pipeline = tag_pipeline(
        tags.clone(),
        PipelineConfig::default().with_tag_prefix("core-v"),
    );
    let release = publishing_release();
    let ctx = ExecutionContext::new();

    pipeline
        .execute_step(&ctx, &release, &Step::tag())
        .await
        .unwrap();
    pipeline
        .execute_step(&ctx, &release, &Step::tag().with_tag_name("latest-core"))
        .await
        .unwrap();

    assert!(tags.has_tag("core-v1.1.0"));
    assert!(tags.has_tag("latest-core"));
}

#[test_case(StepType::Build, Hook::PostVersion)]
#[test_case(StepType::Notify, Hook::PostPublish)]
#[test_case(StepType::Changelog, Hook::PostNotes)]
#[tokio::test]
async fn test_plugin_steps_dispatch_to_hook(step_type: StepType, hook: Hook) {
    let plugin = shared(CountingPlugin::new("worker", vec![hook]));
    let pipeline = plugin_pipeline(&[plugin.clone()]);

    let result = pipeline
        .execute_step(
            &ExecutionContext::new(),
            &publishing_release(),
            &Step::new("work", step_type),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.output, format!("worker ran {} for v1.1.0", hook));
    assert_eq!(plugin.calls(), 1);
}

#[tokio::test]
async fn test_plugin_outputs_are_concatenated() {
    let first = shared(CountingPlugin::new("first", vec![Hook::PostPublish]));
    let second = shared(CountingPlugin::new("second", vec![Hook::PostPublish]));
    let pipeline = plugin_pipeline(&[first, second]);

    let result = pipeline
        .execute_step(
            &ExecutionContext::new(),
            &publishing_release(),
            &Step::new("announce", StepType::Notify),
        )
        .await
        .unwrap();

    assert_eq!(
        result.output,
        "first ran post-publish for v1.1.0\nsecond ran post-publish for v1.1.0"
    );
}

#[tokio::test]
async fn test_failing_plugin_fails_the_step() {
    let ok = shared(CountingPlugin::new("ok", vec![Hook::PostPublish]));
    let broken = shared(CountingPlugin::new("broken", vec![Hook::PostPublish]).failing());
    let pipeline = plugin_pipeline(&[ok, broken]);

    let result = pipeline
        .execute_step(
            &ExecutionContext::new(),
            &publishing_release(),
            &Step::new("artifact", StepType::Artifact),
        )
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("plugin broken: broken refused"));
}

#[tokio::test]
async fn test_non_tag_steps_are_never_idempotent() {
    let pipeline = plugin_pipeline(&[]);
    let done = pipeline
        .check_idempotency(
            &ExecutionContext::new(),
            &publishing_release(),
            &Step::new("notify", StepType::Notify),
        )
        .await
        .unwrap();
    assert!(!done);
}
