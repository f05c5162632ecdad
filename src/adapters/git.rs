// Copyright (c) 2025 - Cowboy AI, Inc.

//! Git tag adapter
//!
//! Shells out to the `git` binary in a repository checkout. Annotated tags
//! are created with `git tag -a` and pushed as `refs/tags/<name>`; the
//! remote side is checked with `git ls-remote`.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::plugin::ExecutionContext;
use crate::publish::{TagCreator, TagError, TagLookup};

/// Tag operations against a local git checkout
#[derive(Debug, Clone)]
pub struct GitTagCreator {
    repository: PathBuf,
}

impl GitTagCreator {
    pub fn new(repository: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
        }
    }

    pub fn repository(&self) -> &Path {
        &self.repository
    }

    async fn git(&self, ctx: &ExecutionContext, args: &[&str]) -> Result<Output, TagError> {
        if ctx.is_cancelled() {
            return Err(TagError::Canceled(ctx.cancellation_reason().to_string()));
        }

        debug!(repository = %self.repository.display(), args = ?args, "Running git");
        Command::new("git")
            .current_dir(&self.repository)
            .args(args)
            .output()
            .await
            .map_err(|e| TagError::Spawn(e.to_string()))
    }

    /// Run a query whose exit code `absent` means "not found"
    async fn git_query(
        &self,
        ctx: &ExecutionContext,
        operation: &'static str,
        args: &[&str],
        absent: i32,
    ) -> Result<bool, TagError> {
        let output = self.git(ctx, args).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(code) if code == absent => Ok(false),
            _ => Err(command_error(operation, &output)),
        }
    }

    async fn git_checked(
        &self,
        ctx: &ExecutionContext,
        operation: &'static str,
        args: &[&str],
    ) -> Result<Output, TagError> {
        let output = self.git(ctx, args).await?;
        if !output.status.success() {
            return Err(command_error(operation, &output));
        }
        Ok(output)
    }
}

fn command_error(operation: &'static str, output: &Output) -> TagError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    };
    TagError::Command { operation, message }
}

#[async_trait]
impl TagCreator for GitTagCreator {
    async fn create_tag(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        message: &str,
    ) -> Result<(), TagError> {
        self.git_checked(ctx, "tag", &["tag", "-a", name, "-m", message])
            .await
            .map(|_| ())
    }

    async fn push_tag(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        remote: &str,
    ) -> Result<(), TagError> {
        let refspec = format!("refs/tags/{}", name);
        self.git_checked(ctx, "push", &["push", remote, refspec.as_str()])
            .await
            .map(|_| ())
    }

    /// `rev-parse --verify` exits 1 for a missing ref; anything else non-zero
    /// (not a repository, broken install) is an error
    async fn tag_exists(&self, ctx: &ExecutionContext, name: &str) -> Result<bool, TagError> {
        let reference = format!("refs/tags/{}", name);
        self.git_query(
            ctx,
            "rev-parse",
            &["rev-parse", "--quiet", "--verify", reference.as_str()],
            1,
        )
        .await
    }

    /// `ls-remote --exit-code` exits 2 when the remote has no such ref
    async fn remote_tag_exists(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        remote: &str,
    ) -> Result<bool, TagError> {
        let reference = format!("refs/tags/{}", name);
        self.git_query(
            ctx,
            "ls-remote",
            &["ls-remote", "--tags", "--exit-code", remote, reference.as_str()],
            2,
        )
        .await
    }
}

#[async_trait]
impl TagLookup for GitTagCreator {
    async fn find_tag(&self, ctx: &ExecutionContext, name: &str) -> Result<bool, TagError> {
        let output = self
            .git_checked(ctx, "tag --list", &["tag", "--list", name])
            .await?;
        let listed = String::from_utf8_lossy(&output.stdout);
        Ok(listed.lines().any(|line| line.trim() == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cim-release-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_tag_exists_outside_repository_is_an_error() {
        let dir = scratch_dir("not-a-repo");
        let git = GitTagCreator::new(&dir);

        let result = git.tag_exists(&ExecutionContext::new(), "v1.0.0").await;
        std::fs::remove_dir_all(&dir).ok();

        // Command when git reports "not a git repository", Spawn without git
        assert!(
            matches!(result, Err(TagError::Command { .. }) | Err(TagError::Spawn(_))),
            "{:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_git() {
        let git = GitTagCreator::new(".");
        let ctx = ExecutionContext::new();
        ctx.cancel();

        let result = git.create_tag(&ctx, "v1.0.0", "Release 1.0.0").await;
        assert_eq!(
            result,
            Err(TagError::Canceled("context canceled".to_string()))
        );
    }
}
