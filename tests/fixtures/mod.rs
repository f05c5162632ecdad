// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-release
//!
//! Shared release builders and test doubles. Identifiers and timestamps
//! used in event fixtures are fixed constants so serialized output is
//! reproducible.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cim_release::aggregate::{PackageRelease, ReleaseAggregate};
use cim_release::domain::{
    BumpType, PackageType, ReleaseId, ReleaseStrategy, SemanticVersion,
};
use cim_release::events::{ReleaseEvent, ReleasePlanned};
use cim_release::plugin::{
    ExecuteRequest, ExecuteResponse, ExecutionContext, Hook, Plugin, PluginError, PluginInfo,
    ValidateResponse,
};
use cim_release::publish::{TagCreator, TagError};

pub const EVENT_ID_1: &str = "01934f4a-0001-7000-8000-000000000001";
pub const RELEASE_ID_1: &str = "01934f4a-1000-7000-8000-000000001000";

// 2026-01-19T12:00:00Z
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub const REPO: &str = "github.com/o/r";

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn release_planned_fixture(package_count: usize) -> ReleaseEvent {
    ReleaseEvent::ReleasePlanned(ReleasePlanned {
        event_id: parse_uuid(EVENT_ID_1),
        release_id: ReleaseId::from_uuid(parse_uuid(RELEASE_ID_1)),
        timestamp: fixed_timestamp(),
        package_count,
    })
}

pub fn version(s: &str) -> SemanticVersion {
    SemanticVersion::parse(s).expect("Invalid version in test fixture")
}

pub fn cargo_package(path: &str, current: &str) -> PackageRelease {
    PackageRelease::new(path, path, PackageType::Cargo, version(current))
}

/// Draft release with `core@1.0.0`
pub fn draft_release() -> ReleaseAggregate {
    let mut release = ReleaseAggregate::create(REPO, "v1.0.0", "HEAD", ReleaseStrategy::Independent);
    release
        .add_package(cargo_package("core", "1.0.0"))
        .expect("Failed to add package");
    release
}

/// `core` bumped to 1.1.0 with notes, in Approved
pub fn approved_release() -> ReleaseAggregate {
    let mut release = draft_release();
    release.plan().expect("plan");
    release
        .set_package_version("core", version("1.1.0"), BumpType::Minor)
        .expect("set version");
    release.set_versions().expect("set versions");
    release
        .set_package_notes("core", "- Faster builds")
        .expect("notes");
    release.generate_notes().expect("generate notes");
    release.approve("alice").expect("approve");
    release
}

/// `approved_release` moved to Publishing, events drained
pub fn publishing_release() -> ReleaseAggregate {
    let mut release = approved_release();
    release.start_publish().expect("start publish");
    release.flush_events();
    release
}

// ============================================================================
// Plugins
// ============================================================================

/// Plugin counting its calls, answering with a fixed outcome
pub struct CountingPlugin {
    pub name: &'static str,
    pub hooks: Vec<Hook>,
    pub succeed: bool,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl CountingPlugin {
    pub fn new(name: &'static str, hooks: Vec<Hook>) -> Self {
        Self {
            name,
            hooks,
            succeed: true,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self) -> Self {
        self.succeed = false;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Plugin for CountingPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo::new(self.name, "1.0.0", self.hooks.clone())
    }

    async fn execute(
        &self,
        _ctx: &ExecutionContext,
        request: ExecuteRequest,
    ) -> Result<ExecuteResponse, PluginError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.succeed {
            Ok(ExecuteResponse::ok(format!(
                "{} ran {} for {}",
                self.name, request.hook, request.context.tag_name
            )))
        } else {
            Ok(ExecuteResponse::failure(format!("{} refused", self.name)))
        }
    }

    async fn validate(&self, _config: &serde_json::Value) -> Result<ValidateResponse, PluginError> {
        Ok(ValidateResponse::valid())
    }
}

/// Plugin whose execution panics
pub struct PanickingPlugin {
    pub hooks: Vec<Hook>,
}

impl PanickingPlugin {
    pub fn new(hooks: Vec<Hook>) -> Self {
        Self { hooks }
    }
}

#[async_trait]
impl Plugin for PanickingPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo::new("panicking", "1.0.0", self.hooks.clone())
    }

    async fn execute(
        &self,
        _ctx: &ExecutionContext,
        _request: ExecuteRequest,
    ) -> Result<ExecuteResponse, PluginError> {
        panic!("boom")
    }

    async fn validate(&self, _config: &serde_json::Value) -> Result<ValidateResponse, PluginError> {
        Ok(ValidateResponse::valid())
    }
}

// ============================================================================
// Tags
// ============================================================================

/// In-memory tag store with scripted failures
///
/// `tags` is the local repository, `pushed` the remote.
#[derive(Default)]
pub struct ScriptedTags {
    pub tags: Mutex<HashSet<String>>,
    pub pushed: Mutex<HashSet<String>>,
    pub messages: Mutex<Vec<String>>,
    pub create_calls: AtomicUsize,
    pub push_calls: AtomicUsize,
    pub fail_create: bool,
    pub fail_push: AtomicBool,
}

impl ScriptedTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_push() -> Self {
        Self {
            fail_push: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    /// Tag present locally and on the remote
    pub fn with_tag(self, name: &str) -> Self {
        self.pushed.lock().unwrap().insert(name.to_string());
        self.with_local_tag(name)
    }

    /// Tag created but never pushed
    pub fn with_local_tag(self, name: &str) -> Self {
        self.tags.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn heal_push(&self) {
        self.fail_push.store(false, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.lock().unwrap().contains(name)
    }

    pub fn is_pushed(&self, name: &str) -> bool {
        self.pushed.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl TagCreator for ScriptedTags {
    async fn create_tag(
        &self,
        _ctx: &ExecutionContext,
        name: &str,
        message: &str,
    ) -> Result<(), TagError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(TagError::Command {
                operation: "tag",
                message: "refusing to tag".to_string(),
            });
        }
        self.tags.lock().unwrap().insert(name.to_string());
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn push_tag(
        &self,
        _ctx: &ExecutionContext,
        name: &str,
        _remote: &str,
    ) -> Result<(), TagError> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(TagError::Command {
                operation: "push",
                message: "remote rejected".to_string(),
            });
        }
        self.pushed.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn tag_exists(&self, _ctx: &ExecutionContext, name: &str) -> Result<bool, TagError> {
        Ok(self.has_tag(name))
    }

    async fn remote_tag_exists(
        &self,
        _ctx: &ExecutionContext,
        name: &str,
        _remote: &str,
    ) -> Result<bool, TagError> {
        Ok(self.is_pushed(name))
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
