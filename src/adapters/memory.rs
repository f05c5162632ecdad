// Copyright (c) 2025 - Cowboy AI, Inc.

//! In-memory repository and publisher
//!
//! Releases are stored as serialized JSON snapshots, so a loaded aggregate
//! never carries events buffered before `save`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::aggregate::ReleaseAggregate;
use crate::domain::{ReleaseId, ReleaseState};
use crate::events::ReleaseEvent;
use crate::ports::{
    EventPublisher, ListOptions, PublishError, ReleaseRepository, RepositoryError,
};

struct StoredRelease {
    /// Insertion sequence, breaks `created_at` ties
    seq: u64,
    snapshot: serde_json::Value,
}

#[derive(Default)]
struct Store {
    releases: HashMap<ReleaseId, StoredRelease>,
    next_seq: u64,
}

/// Release repository held in process memory
#[derive(Default)]
pub struct InMemoryReleaseRepository {
    store: RwLock<Store>,
}

impl InMemoryReleaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every release, newest first
    fn load_all(&self) -> Result<Vec<ReleaseAggregate>, RepositoryError> {
        let store = self.read();
        let mut stored: Vec<(u64, ReleaseAggregate)> = store
            .releases
            .values()
            .map(|entry| -> Result<_, RepositoryError> {
                Ok((entry.seq, decode(&entry.snapshot)?))
            })
            .collect::<Result<_, _>>()?;

        stored.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b_seq.cmp(a_seq))
        });
        Ok(stored.into_iter().map(|(_, release)| release).collect())
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode(snapshot: &serde_json::Value) -> Result<ReleaseAggregate, RepositoryError> {
    serde_json::from_value(snapshot.clone()).map_err(|e| RepositoryError::Storage(e.to_string()))
}

#[async_trait]
impl ReleaseRepository for InMemoryReleaseRepository {
    async fn save(&self, release: &ReleaseAggregate) -> Result<(), RepositoryError> {
        let snapshot =
            serde_json::to_value(release).map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let mut store = self.write();
        let seq = match store.releases.get(&release.id()) {
            Some(existing) => existing.seq,
            None => {
                store.next_seq += 1;
                store.next_seq
            }
        };
        store
            .releases
            .insert(release.id(), StoredRelease { seq, snapshot });

        debug!(release_id = %release.id(), state = %release.state(), "Release saved");
        Ok(())
    }

    async fn find_by_id(&self, id: ReleaseId) -> Result<ReleaseAggregate, RepositoryError> {
        let store = self.read();
        let entry = store
            .releases
            .get(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        decode(&entry.snapshot)
    }

    async fn find_active(&self, repo_id: &str) -> Result<ReleaseAggregate, RepositoryError> {
        self.load_all()?
            .into_iter()
            .find(|r| r.repo_id() == repo_id && !r.is_terminal())
            .ok_or_else(|| RepositoryError::NoActiveRelease(repo_id.to_string()))
    }

    async fn find_latest(&self, repo_id: &str) -> Result<ReleaseAggregate, RepositoryError> {
        self.load_all()?
            .into_iter()
            .find(|r| r.repo_id() == repo_id)
            .ok_or_else(|| RepositoryError::NoRelease(repo_id.to_string()))
    }

    async fn find_by_state(
        &self,
        state: ReleaseState,
    ) -> Result<Vec<ReleaseAggregate>, RepositoryError> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.state() == state)
            .collect())
    }

    async fn list(&self, options: &ListOptions) -> Result<Vec<ReleaseAggregate>, RepositoryError> {
        let matching = self
            .load_all()?
            .into_iter()
            .filter(|r| options.matches(r))
            .skip(options.offset);

        Ok(if options.limit == 0 {
            matching.collect()
        } else {
            matching.take(options.limit).collect()
        })
    }

    async fn delete(&self, id: ReleaseId) -> Result<(), RepositoryError> {
        if self.write().releases.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(id));
        }
        debug!(release_id = %id, "Release deleted");
        Ok(())
    }
}

/// Publisher that records every delivered event
#[derive(Default)]
pub struct InMemoryEventPublisher {
    events: RwLock<Vec<ReleaseEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered so far, in order
    pub fn events(&self) -> Vec<ReleaseEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event type names delivered so far
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ReleaseEvent::event_type)
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), PublishError> {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReleaseStrategy;

    #[tokio::test]
    async fn test_saved_release_drops_pending_events() {
        let repo = InMemoryReleaseRepository::new();
        let release = ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Independent);
        assert_eq!(release.pending_events().len(), 1);

        repo.save(&release).await.unwrap();
        let loaded = repo.find_by_id(release.id()).await.unwrap();

        assert_eq!(loaded.id(), release.id());
        assert!(loaded.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_release() {
        let repo = InMemoryReleaseRepository::new();
        let id = ReleaseId::new();
        assert_eq!(repo.delete(id).await, Err(RepositoryError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_latest_and_active_misses_are_distinct() {
        let repo = InMemoryReleaseRepository::new();
        assert_eq!(
            repo.find_latest("repo").await.unwrap_err(),
            RepositoryError::NoRelease("repo".to_string())
        );

        let mut release =
            ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Independent);
        release.cancel("not needed").unwrap();
        repo.save(&release).await.unwrap();

        assert_eq!(repo.find_latest("repo").await.unwrap().id(), release.id());
        assert_eq!(
            repo.find_active("repo").await.unwrap_err(),
            RepositoryError::NoActiveRelease("repo".to_string())
        );
    }

    #[tokio::test]
    async fn test_publisher_records_in_order() {
        let publisher = InMemoryEventPublisher::new();
        let mut release =
            ReleaseAggregate::create("repo", "v1", "HEAD", ReleaseStrategy::Independent);
        release.cancel("not needed").unwrap();

        publisher.publish(&release.flush_events()).await.unwrap();
        assert_eq!(
            publisher.event_types(),
            vec!["release.created", "release.canceled"]
        );

        publisher.clear();
        assert!(publisher.events().is_empty());
    }
}
