// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin Runtime
//!
//! Plugins extend the release lifecycle at named [`Hook`]s. This module
//! provides:
//! - The [`Plugin`] capability trait and its request/response types
//! - A lock-guarded [`PluginRegistry`] owned by the caller
//! - [`SequentialExecutor`] and [`ParallelExecutor`] implementing
//!   [`HookExecutor`]
//! - [`ExecutionContext`] for cooperative cancellation and deadlines
//!
//! A plugin's own failure is data: it comes back as an unsuccessful
//! [`ExecuteResponse`] in the batch. Only registry misconfiguration is an
//! [`ExecutorError`].

pub mod context;
pub mod executor;
pub mod hook;
pub mod registry;
pub mod types;

pub use context::ExecutionContext;
pub use executor::{
    ExecutorError, HookExecutor, HookResult, ParallelExecutor, SequentialExecutor,
};
pub use hook::{Hook, UnknownHook};
pub use registry::{PluginRegistry, RegistryError};
pub use types::{
    ConfigIssue, ExecuteRequest, ExecuteResponse, PackageChanges, Plugin, PluginError,
    PluginInfo, PluginInstance, PluginState, ReleaseContext, ValidateResponse,
};
