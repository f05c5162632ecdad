// Copyright (c) 2025 - Cowboy AI, Inc.

//! Port implementations
//!
//! - [`memory`]: in-process repository and recording publisher
//! - [`nats`]: NATS event publisher
//! - [`git`]: tag creation through the `git` binary
//!
//! [`CompositeEventPublisher`] fans one batch out to several publishers.

pub mod git;
pub mod memory;
pub mod nats;

pub use git::GitTagCreator;
pub use memory::{InMemoryEventPublisher, InMemoryReleaseRepository};
pub use nats::NatsEventPublisher;

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::ReleaseEvent;
use crate::ports::{EventPublisher, PublishError};

/// Publishes to each inner publisher in order; the first error stops
/// delivery to the rest
#[derive(Default, Clone)]
pub struct CompositeEventPublisher {
    publishers: Vec<Arc<dyn EventPublisher>>,
}

impl CompositeEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

#[async_trait]
impl EventPublisher for CompositeEventPublisher {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), PublishError> {
        for publisher in &self.publishers {
            publisher.publish(events).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReleaseAggregate;
    use crate::domain::ReleaseStrategy;

    struct Refusing;

    #[async_trait]
    impl EventPublisher for Refusing {
        async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), PublishError> {
            Err(PublishError::Delivery {
                event_type: events[0].event_type(),
                message: "webhook down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_composite_stops_at_first_error() {
        let first = Arc::new(InMemoryEventPublisher::new());
        let last = Arc::new(InMemoryEventPublisher::new());
        let composite = CompositeEventPublisher::new()
            .with(first.clone())
            .with(Arc::new(Refusing))
            .with(last.clone());

        let mut release =
            ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Independent);
        let result = composite.publish(&release.flush_events()).await;

        assert!(matches!(result, Err(PublishError::Delivery { .. })));
        assert_eq!(first.events().len(), 1);
        assert!(last.events().is_empty());
    }
}
