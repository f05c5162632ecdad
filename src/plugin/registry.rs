// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plugin registry
//!
//! Thread-safe store of registered plugins, owned by whoever builds the
//! executors (never global). A single read/write lock guards the map:
//! lookups take the read lock, `register`/`unregister` and state updates
//! take the write lock. Callers receive `Arc` handles, never references
//! into the map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use super::hook::Hook;
use super::types::{Plugin, PluginInstance, PluginState};
use crate::domain::PluginId;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid plugin: {0}")]
    InvalidPlugin(String),

    #[error("Plugin {0} is already registered")]
    PluginAlreadyRegistered(PluginId),

    #[error("Plugin {0} not found")]
    PluginNotFound(PluginId),
}

#[derive(Default)]
struct RegistryInner {
    plugins: HashMap<PluginId, Arc<PluginInstance>>,
    /// Registration order, used for deterministic hook dispatch
    order: Vec<PluginId>,
}

/// In-memory plugin registry
#[derive(Default)]
pub struct PluginRegistry {
    inner: RwLock<RegistryInner>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under `id`
    pub fn register(
        &self,
        id: impl Into<PluginId>,
        plugin: Arc<dyn Plugin>,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistryError::InvalidPlugin(
                "plugin ID cannot be empty".to_string(),
            ));
        }

        let instance = PluginInstance::new(id.clone(), plugin);
        let mut inner = self.write();
        if inner.plugins.contains_key(&id) {
            return Err(RegistryError::PluginAlreadyRegistered(id));
        }

        info!(
            plugin_id = %id,
            name = %instance.info.name,
            version = %instance.info.version,
            hooks = instance.info.hooks.len(),
            "Plugin registered"
        );
        inner.order.push(id.clone());
        inner.plugins.insert(id, Arc::new(instance));
        Ok(())
    }

    pub fn unregister(&self, id: &PluginId) -> Result<(), RegistryError> {
        let mut inner = self.write();
        if inner.plugins.remove(id).is_none() {
            return Err(RegistryError::PluginNotFound(id.clone()));
        }
        inner.order.retain(|existing| existing != id);

        info!(plugin_id = %id, "Plugin unregistered");
        Ok(())
    }

    pub fn get(&self, id: &PluginId) -> Result<Arc<PluginInstance>, RegistryError> {
        self.read()
            .plugins
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::PluginNotFound(id.clone()))
    }

    /// Ready plugins declaring `hook`, in registration order
    ///
    /// Plugins set to `Loading`, `Error` or `Disabled` are not dispatched
    /// until they are set back to `Ready`.
    pub fn get_by_hook(&self, hook: Hook) -> Vec<Arc<PluginInstance>> {
        let inner = self.read();
        let matching: Vec<_> = inner
            .order
            .iter()
            .filter_map(|id| inner.plugins.get(id))
            .filter(|instance| instance.state == PluginState::Ready)
            .filter(|instance| instance.info.supports(hook))
            .cloned()
            .collect();

        debug!(hook = %hook, count = matching.len(), "Resolved plugins for hook");
        matching
    }

    /// All plugins, in registration order
    pub fn list(&self) -> Vec<Arc<PluginInstance>> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.plugins.get(id))
            .cloned()
            .collect()
    }

    pub fn has(&self, id: &PluginId) -> bool {
        self.read().plugins.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a plugin's runtime state and last error
    pub fn set_state(
        &self,
        id: &PluginId,
        state: PluginState,
        error: Option<String>,
    ) -> Result<(), RegistryError> {
        self.update(id, |instance| {
            instance.state = state;
            instance.error = error;
        })?;
        debug!(plugin_id = %id, state = %state, "Plugin state changed");
        Ok(())
    }

    /// Store the configuration used when a request carries none
    pub fn set_config(&self, id: &PluginId, config: serde_json::Value) -> Result<(), RegistryError> {
        self.update(id, |instance| instance.config = Some(config))
    }

    fn update<F>(&self, id: &PluginId, apply: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut PluginInstance),
    {
        let mut inner = self.write();
        let entry = inner
            .plugins
            .get_mut(id)
            .ok_or_else(|| RegistryError::PluginNotFound(id.clone()))?;

        // Handles given out earlier keep their snapshot.
        let mut updated = (**entry).clone();
        apply(&mut updated);
        *entry = Arc::new(updated);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
