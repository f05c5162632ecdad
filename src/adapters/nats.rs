// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS event publisher
//!
//! Publishes each release event as JSON on its subject:
//!
//! ```text
//! ReleasePlanned      → release.lifecycle.planned
//! PackagePublished    → release.package.published
//! ```

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::InfrastructureError;
use crate::events::ReleaseEvent;
use crate::nats::NatsClient;
use crate::ports::{EventPublisher, PublishError};
use crate::subjects::SubjectBuilder;

/// Delivers release events to NATS subjects
#[derive(Clone)]
pub struct NatsEventPublisher {
    client: NatsClient,
}

impl NatsEventPublisher {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    /// Subject `event` is published on
    pub fn subject_for(event: &ReleaseEvent) -> String {
        SubjectBuilder::for_event(event).build()
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), PublishError> {
        for event in events {
            let subject = Self::subject_for(event);
            self.client
                .publish(&subject, event)
                .await
                .map_err(|e| {
                    warn!(
                        release_id = %event.release_id(),
                        subject = %subject,
                        error = %e,
                        "Failed to publish release event"
                    );
                    match e {
                        InfrastructureError::Serialization(message) => {
                            PublishError::Serialization {
                                event_type: event.event_type(),
                                message,
                            }
                        }
                        other => PublishError::Delivery {
                            event_type: event.event_type(),
                            message: other.to_string(),
                        },
                    }
                })?;
        }

        debug!(count = events.len(), "Published release events to NATS");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReleaseAggregate;
    use crate::domain::ReleaseStrategy;

    #[test]
    fn test_subjects_for_lifecycle_events() {
        let mut release =
            ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Independent);
        release.fail("build broke").unwrap();

        let subjects: Vec<_> = release
            .flush_events()
            .iter()
            .map(NatsEventPublisher::subject_for)
            .collect();
        assert_eq!(
            subjects,
            vec!["release.lifecycle.created", "release.lifecycle.failed"]
        );
    }
}
