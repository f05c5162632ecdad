// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tag ports consumed by the publish pipeline

use async_trait::async_trait;

use crate::plugin::ExecutionContext;

/// Tag operation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// The underlying command ran and reported failure
    #[error("git {operation} failed: {message}")]
    Command {
        operation: &'static str,
        message: String,
    },

    /// The command could not be started
    #[error("failed to run git: {0}")]
    Spawn(String),

    #[error("{0}")]
    Canceled(String),
}

/// Creates, pushes and checks tags
#[async_trait]
pub trait TagCreator: Send + Sync {
    async fn create_tag(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        message: &str,
    ) -> Result<(), TagError>;

    async fn push_tag(&self, ctx: &ExecutionContext, name: &str, remote: &str)
        -> Result<(), TagError>;

    /// Whether the tag exists in the local repository
    async fn tag_exists(&self, ctx: &ExecutionContext, name: &str) -> Result<bool, TagError>;

    /// Whether `remote` already carries the tag
    async fn remote_tag_exists(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        remote: &str,
    ) -> Result<bool, TagError>;
}

/// Lower-level tag lookup used for idempotency checks
#[async_trait]
pub trait TagLookup: Send + Sync {
    async fn find_tag(&self, ctx: &ExecutionContext, name: &str) -> Result<bool, TagError>;
}
