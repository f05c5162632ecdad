// Copyright (c) 2025 - Cowboy AI, Inc.
//! Persistence and delivery ports
//!
//! The release core depends on these two traits only. Concrete stores and
//! publishers live in [`crate::adapters`] or outside the crate.
//!
//! # Flow
//!
//! ```text
//! ReleaseRepository::find_by_id → mutate → ReleaseRepository::save
//!                                              ↓
//!                                  flush_events → EventPublisher::publish
//! ```

use async_trait::async_trait;

use crate::aggregate::ReleaseAggregate;
use crate::domain::{ReleaseId, ReleaseState};
use crate::events::ReleaseEvent;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Release {0} not found")]
    NotFound(ReleaseId),

    #[error("No active release for repository {0}")]
    NoActiveRelease(String),

    #[error("No release recorded for repository {0}")]
    NoRelease(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Event delivery errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to serialize event {event_type}: {message}")]
    Serialization {
        event_type: &'static str,
        message: String,
    },

    #[error("Failed to deliver event {event_type}: {message}")]
    Delivery {
        event_type: &'static str,
        message: String,
    },
}

/// Filter and paging for [`ReleaseRepository::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub repo_id: Option<String>,
    pub state: Option<ReleaseState>,
    /// Zero means no limit
    pub limit: usize,
    pub offset: usize,
    /// Include Published, Failed and Canceled releases
    pub include_terminal: bool,
}

impl ListOptions {
    pub fn for_repo(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: Some(repo_id.into()),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: ReleaseState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn including_terminal(mut self) -> Self {
        self.include_terminal = true;
        self
    }

    /// Whether `release` passes the filters (paging excluded)
    pub fn matches(&self, release: &ReleaseAggregate) -> bool {
        self.repo_id
            .as_deref()
            .map_or(true, |repo| release.repo_id() == repo)
            && self.state.map_or(true, |state| release.state() == state)
            && (self.include_terminal || self.state.is_some() || !release.is_terminal())
    }
}

/// Release persistence
///
/// Implementations store the aggregate's state only; pending events are
/// drained and published by the caller after `save`.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    /// Insert or replace a release
    async fn save(&self, release: &ReleaseAggregate) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ReleaseId) -> Result<ReleaseAggregate, RepositoryError>;

    /// Newest non-terminal release for a repository
    async fn find_active(&self, repo_id: &str) -> Result<ReleaseAggregate, RepositoryError>;

    /// Newest release for a repository, terminal or not
    async fn find_latest(&self, repo_id: &str) -> Result<ReleaseAggregate, RepositoryError>;

    async fn find_by_state(
        &self,
        state: ReleaseState,
    ) -> Result<Vec<ReleaseAggregate>, RepositoryError>;

    /// Releases matching `options`, newest first
    async fn list(&self, options: &ListOptions) -> Result<Vec<ReleaseAggregate>, RepositoryError>;

    async fn delete(&self, id: ReleaseId) -> Result<(), RepositoryError>;
}

/// Domain event delivery
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver events in order
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), PublishError>;
}
