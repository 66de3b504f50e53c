//! Identity selection: which identities may register for an event.
//!
//! Selection is a collaborator contract so deployments can plug in their own
//! referenceability rules (access control, search indexes). The store-backed
//! implementation answers from records alone: an identity is referenceable
//! when it exists with the requested type and is not already registered on
//! the event, unless the event explicitly allows duplicate registrants.

use crate::core::EntityRef;
use crate::store::RecordStore;

/// Answers "which identities of a type are referenceable for one event".
pub trait IdentitySelection {
    /// Count referenceable identities of `entity_type`, optionally narrowed
    /// to one bundle.
    fn count_referenceable(&self, entity_type: &str, bundle: Option<&str>) -> usize;

    /// Filter `ids` down to those that may register.
    fn filter_referenceable(&self, entity_type: &str, ids: &[u32]) -> Vec<u32>;
}

/// Store-backed selection scoped to one event.
pub struct StoreSelection<'a> {
    store: &'a RecordStore,
    event: EntityRef,
    allow_duplicates: bool,
}

impl<'a> StoreSelection<'a> {
    /// Create a selection for an event, reading the duplicate policy from
    /// the event's settings. Events without a settings record disallow
    /// duplicates.
    #[must_use]
    pub fn for_event(store: &'a RecordStore, event: EntityRef) -> Self {
        let allow_duplicates = store
            .event_settings(&event)
            .is_some_and(|s| s.allow_duplicate_registrants);
        Self {
            store,
            event,
            allow_duplicates,
        }
    }

    fn already_registered(&self, identity: &EntityRef) -> bool {
        self.store
            .registrants_for_event(&self.event)
            .iter()
            .any(|registrant| registrant.has_identity(identity))
    }

    fn referenceable(&self, identity: &EntityRef) -> bool {
        self.store.identity(identity).is_some()
            && (self.allow_duplicates || !self.already_registered(identity))
    }
}

impl IdentitySelection for StoreSelection<'_> {
    fn count_referenceable(&self, entity_type: &str, bundle: Option<&str>) -> usize {
        self.store
            .identities_of_type(entity_type)
            .filter(|(_, identity)| bundle.is_none_or(|b| identity.bundle == b))
            .filter(|(entity, _)| self.allow_duplicates || !self.already_registered(entity))
            .count()
    }

    fn filter_referenceable(&self, entity_type: &str, ids: &[u32]) -> Vec<u32> {
        ids.iter()
            .copied()
            .filter(|id| self.referenceable(&EntityRef::new(entity_type, *id)))
            .collect()
    }
}
