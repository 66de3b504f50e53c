//! Registrant slots and the pre-commit contract.
//!
//! A registrant binds an identity (or anonymous field data) to exactly one
//! registration. The store runs [`pre_commit`] before every registrant write
//! commits; it validates the registration reference, enforces the event
//! type's anonymous policy, attaches identities by email, and syncs shared
//! field data both ways.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{two_way_fill, EntityRef, Fields, RegistrantId, RegistrationId};
use crate::error::Error;
use crate::events::EventManager;
use crate::store::RecordStore;

/// A slot binding an identity or anonymous data to a registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registrant {
    /// Store-assigned id; `RegistrantId::UNSAVED` until inserted.
    pub id: RegistrantId,
    /// The owning registration. Required by the time the slot is written.
    pub registration: Option<RegistrationId>,
    /// Registrant bundle; filled from the event type default when unset.
    pub bundle: Option<String>,
    /// The attached identity, if any.
    pub identity: Option<EntityRef>,
    /// Field data mirrorable with the identity.
    pub fields: Fields,
}

impl Registrant {
    /// Create an unsaved registrant for a registration.
    #[must_use]
    pub fn new(registration: RegistrationId) -> Self {
        Self {
            id: RegistrantId::UNSAVED,
            registration: Some(registration),
            bundle: None,
            identity: None,
            fields: Fields::new(),
        }
    }

    /// Create an unsaved registrant with no registration yet.
    ///
    /// Such a registrant cannot be written until a registration is set.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            id: RegistrantId::UNSAVED,
            registration: None,
            bundle: None,
            identity: None,
            fields: Fields::new(),
        }
    }

    /// Attach an identity (builder pattern).
    #[must_use]
    pub fn with_identity(mut self, identity: EntityRef) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set a field value (builder pattern).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.set(name, value);
        self
    }

    /// Clear the attached identity, leaving the slot anonymous.
    pub fn clear_identity(&mut self) {
        self.identity = None;
    }

    /// Whether this slot holds the given identity.
    ///
    /// Comparison is structural on (entity type, id): two independently
    /// built references to the same record compare equal.
    #[must_use]
    pub fn has_identity(&self, identity: &EntityRef) -> bool {
        self.identity.as_ref() == Some(identity)
    }
}

/// Validate and normalize a registrant before its write commits.
///
/// Runs inside the store's insert/update path:
///
/// 1. A missing registration reference is invalid.
/// 2. The event type is resolved through the registration's event.
/// 3. Identity-less registrants are rejected when the event type disallows
///    anonymous registrants.
/// 4. With auto-attach enabled, an identity matching the configured email
///    field is attached when one exists; no match is not a failure.
/// 5. With auto-sync enabled, shared fields are filled both ways; identity
///    changes are persisted as plain writes, which do not re-enter this
///    contract.
pub(crate) fn pre_commit(
    registrant: &mut Registrant,
    store: &mut RecordStore,
    types: &EventManager,
) -> Result<(), Error> {
    let registration_id = registrant
        .registration
        .ok_or_else(|| Error::InvalidRegistrant("registrant has no registration".into()))?;
    let registration = store.registration(registration_id).cloned().ok_or_else(|| {
        Error::InvalidRegistrant(format!("registration {registration_id} does not exist"))
    })?;
    let event = registration.event.clone();
    let bundle = store
        .event(&event)
        .map(|record| record.bundle.clone())
        .ok_or_else(|| Error::InvalidRegistrant(format!("event {event} does not exist")))?;
    let event_type = types
        .event_type(&event.entity_type, &bundle)
        .ok_or_else(|| Error::InvalidEvent {
            entity_type: event.entity_type.clone(),
            bundle,
        })?;

    if registrant.bundle.is_none() {
        registrant.bundle = event_type.default_registrant_bundle.clone();
    }

    if registrant.identity.is_none() && !event_type.allow_anon_registrants {
        return Err(Error::InvalidRegistrant(
            "registrant has no identity, and anonymous registrants are not allowed".into(),
        ));
    }

    if registrant.identity.is_none() && event_type.auto_attach_identities {
        if let Some(email_field) = &event_type.registrant_email_field {
            if let Some(email) = registrant.fields.get(email_field).filter(|e| !e.is_empty()) {
                if let Some(found) = store.find_identity_by_email(email) {
                    debug!(identity = %found, "auto-attached identity by email");
                    registrant.identity = Some(found);
                }
            }
        }
    }

    if event_type.auto_sync_registrants {
        if let Some(identity_ref) = registrant.identity.clone() {
            if let Some(identity) = store.identity(&identity_ref) {
                let mut identity_fields = identity.fields.clone();
                let outcome = two_way_fill(&mut registrant.fields, &mut identity_fields);
                if outcome.right_changed {
                    // Plain write: identity persistence must not cascade
                    // back into registrant sync.
                    store.update_identity_fields(&identity_ref, identity_fields)?;
                    debug!(identity = %identity_ref, "synced registrant fields onto identity");
                }
            }
        }
    }

    Ok(())
}
