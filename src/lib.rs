//! Release orchestration engine for the Composable Information Machine
//!
//! Coordinates multi-package releases through a validated lifecycle:
//! a release aggregate with an owned event buffer, a plugin runtime that
//! runs extensions at lifecycle hooks, and an idempotent step-based
//! publish pipeline. NATS delivery, in-memory persistence and git tagging
//! are provided as adapters behind narrow ports.

pub mod adapters;
pub mod aggregate;
pub mod domain;
pub mod errors;
pub mod events;
pub mod nats;
pub mod plugin;
pub mod ports;
pub mod publish;
pub mod service;
pub mod state_machine;
pub mod subjects;
pub mod telemetry;

// Re-export commonly used types
pub use aggregate::{PackageRelease, ReleaseAggregate, ReleaseError, ReleaseResult};
pub use domain::{
    calculate_next_version, BumpType, PackageState, PackageType, PluginId, ReleaseId,
    ReleaseState, ReleaseStrategy, SemanticVersion,
};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use events::ReleaseEvent;
pub use nats::{NatsClient, NatsConfig};
pub use plugin::{
    ExecutionContext, Hook, HookExecutor, ParallelExecutor, Plugin, PluginRegistry,
    SequentialExecutor,
};
pub use publish::{PipelineConfig, PublishPipeline, Step, StepResult, StepType};
pub use service::{PublishReport, ReleaseService};
