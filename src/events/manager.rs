//! EventManager: event type registry and meta cache.
//!
//! The manager owns the (entity type, bundle) → [`EventType`] table and
//! memoizes one [`EventMeta`] per event entity. Memoized metas snapshot
//! their event type, so any event type mutation must be followed by
//! [`EventManager::invalidate_event_type`] — stale reads are otherwise
//! possible by design.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::{EntityRef, SystemConfig};
use crate::error::Error;
use crate::events::{EventMeta, EventType};
use crate::store::RecordStore;

/// Registry of event types and memoized event metas.
#[derive(Default)]
pub struct EventManager {
    config: SystemConfig,
    event_types: FxHashMap<(String, String), EventType>,
    metas: FxHashMap<EntityRef, EventMeta>,
}

impl EventManager {
    /// Create a manager with the given site configuration.
    #[must_use]
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            event_types: FxHashMap::default(),
            metas: FxHashMap::default(),
        }
    }

    /// The site configuration.
    #[must_use]
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Register an event type, replacing any previous one for the same
    /// (entity type, bundle) pair and invalidating its derived metas.
    pub fn register_event_type(&mut self, event_type: EventType) {
        let key = (
            event_type.entity_type().to_string(),
            event_type.bundle().to_string(),
        );
        self.invalidate_event_type(&key.0, &key.1);
        self.event_types.insert(key, event_type);
    }

    /// Look up the event type for an (entity type, bundle) pair.
    #[must_use]
    pub fn event_type(&self, entity_type: &str, bundle: &str) -> Option<&EventType> {
        self.event_types
            .get(&(entity_type.to_string(), bundle.to_string()))
    }

    /// Event types hosted by one entity type.
    #[must_use]
    pub fn event_types_with_entity_type(&self, entity_type: &str) -> Vec<&EventType> {
        let mut found: Vec<&EventType> = self
            .event_types
            .values()
            .filter(|et| et.entity_type() == entity_type)
            .collect();
        found.sort_by_key(|et| et.id());
        found
    }

    /// Whether an entity is an event: it has an event record whose bundle
    /// is registered.
    #[must_use]
    pub fn is_event(&self, store: &RecordStore, entity: &EntityRef) -> bool {
        store
            .event(entity)
            .is_some_and(|record| self.event_type(&entity.entity_type, &record.bundle).is_some())
    }

    /// Get the memoized meta for an event entity, building it on first use.
    ///
    /// Fails with [`Error::InvalidEvent`] when the entity has no event
    /// record or its bundle is not registered as an event type.
    pub fn meta(&mut self, store: &RecordStore, entity: &EntityRef) -> Result<&EventMeta, Error> {
        if !self.metas.contains_key(entity) {
            let bundle = store
                .event(entity)
                .map(|record| record.bundle.clone())
                .unwrap_or_default();
            let event_type = self
                .event_type(&entity.entity_type, &bundle)
                .cloned()
                .ok_or_else(|| Error::InvalidEvent {
                    entity_type: entity.entity_type.clone(),
                    bundle,
                })?;
            self.metas.insert(
                entity.clone(),
                EventMeta::new(entity.clone(), event_type, self.config.clone()),
            );
        }
        Ok(self.metas.get(entity).expect("just inserted"))
    }

    /// Drop every memoized meta derived from one event type. Must be called
    /// after mutating that event type's configuration.
    pub fn invalidate_event_type(&mut self, entity_type: &str, bundle: &str) {
        let before = self.metas.len();
        self.metas.retain(|_, meta| {
            meta.event_type().entity_type() != entity_type || meta.event_type().bundle() != bundle
        });
        let dropped = before - self.metas.len();
        if dropped > 0 {
            debug!(entity_type, bundle, dropped, "invalidated event metas");
        }
    }

    /// Drop every memoized meta.
    pub fn invalidate_all(&mut self) {
        self.metas.clear();
    }

    /// Remove an event type, dropping its derived metas.
    pub fn remove_event_type(&mut self, entity_type: &str, bundle: &str) -> Option<EventType> {
        self.invalidate_event_type(entity_type, bundle);
        self.event_types
            .remove(&(entity_type.to_string(), bundle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSettings;

    fn manager() -> EventManager {
        let mut manager = EventManager::new(SystemConfig::new());
        manager.register_event_type(EventType::new("node", "conference"));
        manager
    }

    fn store_with_event(entity: &EntityRef, bundle: &str) -> RecordStore {
        let mut store = RecordStore::new();
        store.insert_event(entity.clone(), bundle, EventSettings::default());
        store
    }

    #[test]
    fn test_is_event_requires_registered_bundle() {
        let manager = manager();
        let conference = EntityRef::new("node", 1);
        let page = EntityRef::new("node", 2);
        let mut store = store_with_event(&conference, "conference");
        store.insert_event(page.clone(), "page", EventSettings::default());

        assert!(manager.is_event(&store, &conference));
        assert!(!manager.is_event(&store, &page));
        assert!(!manager.is_event(&store, &EntityRef::new("node", 99)));
    }

    #[test]
    fn test_meta_fails_for_unregistered_bundle() {
        let mut manager = manager();
        let page = EntityRef::new("node", 2);
        let store = store_with_event(&page, "page");

        let err = manager.meta(&store, &page).unwrap_err();
        assert!(matches!(err, Error::InvalidEvent { bundle, .. } if bundle == "page"));
    }

    #[test]
    fn test_meta_is_memoized_until_invalidated() {
        let mut manager = manager();
        let conference = EntityRef::new("node", 1);
        let store = store_with_event(&conference, "conference");

        manager.meta(&store, &conference).unwrap();

        // Mutating the registered type alone does not refresh the meta.
        manager.event_types.insert(
            ("node".into(), "conference".into()),
            EventType::new("node", "conference").with_allow_anon_registrants(true),
        );
        let stale = manager.meta(&store, &conference).unwrap();
        assert!(!stale.event_type().allow_anon_registrants);

        manager.invalidate_event_type("node", "conference");
        let fresh = manager.meta(&store, &conference).unwrap();
        assert!(fresh.event_type().allow_anon_registrants);
    }

    #[test]
    fn test_register_event_type_replaces_and_invalidates() {
        let mut manager = manager();
        let conference = EntityRef::new("node", 1);
        let store = store_with_event(&conference, "conference");
        manager.meta(&store, &conference).unwrap();

        manager.register_event_type(
            EventType::new("node", "conference").with_allow_anon_registrants(true),
        );
        let fresh = manager.meta(&store, &conference).unwrap();
        assert!(fresh.event_type().allow_anon_registrants);
    }

    #[test]
    fn test_remove_event_type() {
        let mut manager = manager();
        let conference = EntityRef::new("node", 1);
        let store = store_with_event(&conference, "conference");

        assert!(manager.remove_event_type("node", "conference").is_some());
        assert!(!manager.is_event(&store, &conference));
        assert!(manager.meta(&store, &conference).is_err());
    }
}
