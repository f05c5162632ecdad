// Copyright (c) 2025 - Cowboy AI, Inc.
//! Publish Pipeline
//!
//! Step-based publishing for a release in `Publishing`. Each step is safe
//! to re-run after a crash: tag steps check for the tag before creating
//! it, and every partial failure hands back a [`StepResult`] recording
//! how far it got.

pub mod config;
pub mod pipeline;
pub mod step;
pub mod tags;

pub use config::PipelineConfig;
pub use pipeline::{PipelineError, PublishPipeline};
pub use step::{Step, StepResult, StepType};
pub use tags::{TagCreator, TagError, TagLookup};
