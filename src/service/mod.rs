// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer
//!
//! Application services that coordinate the aggregate, persistence, event
//! delivery and the publish pipeline.

pub mod release;

pub use release::{PublishReport, ReleaseService, ServiceError, ServiceResult, StepOutcome};
