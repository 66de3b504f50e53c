//! In-memory record store.
//!
//! The store is the persistence collaborator behind every entity load in
//! this crate: typed tables with auto-assigned ids, field-equality queries,
//! and the joined lookups the capacity math needs. Tables are persistent
//! maps, so cloning a store is cheap; callers wanting optimistic retry
//! around a count-then-decide sequence can work on a clone and swap it in.
//!
//! Ids follow the registry idiom: records arrive with id `0` (unsaved) and
//! get a real id on insert. Iteration is in ascending id order, which is
//! what makes rule evaluation order stable for a fixed input set.
//!
//! The registrant pre-commit contract runs inside `insert_registrant` and
//! `update_registrant`; nothing else in the crate writes registrants.

use im::OrdMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ComponentId, EntityRef, Fields, GroupId, RegistrantId, RegistrationId, RuleId};
use crate::error::{Error, GroupConstraintError};
use crate::events::{EventManager, EventSettings};
use crate::groups::Group;
use crate::identity::Identity;
use crate::registration::{pre_commit, Registrant, Registration};
use crate::rules::Rule;

/// The store's projection of an externally-owned event record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The event's bundle, used to resolve its event type.
    pub bundle: String,
    /// Registration settings attached to the event.
    pub settings: EventSettings,
}

/// Typed record tables with filtered and joined queries.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    events: OrdMap<EntityRef, EventRecord>,
    identities: OrdMap<EntityRef, Identity>,
    registrations: OrdMap<RegistrationId, Registration>,
    registrants: OrdMap<RegistrantId, Registrant>,
    groups: OrdMap<GroupId, Group>,
    rules: OrdMap<RuleId, Rule>,

    next_registration: u32,
    next_registrant: u32,
    next_group: u32,
    next_rule: u32,
    next_component: u32,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Events ===

    /// Register an event record.
    pub fn insert_event(
        &mut self,
        entity: EntityRef,
        bundle: impl Into<String>,
        settings: EventSettings,
    ) {
        self.events.insert(
            entity,
            EventRecord {
                bundle: bundle.into(),
                settings,
            },
        );
    }

    /// Get an event record.
    #[must_use]
    pub fn event(&self, entity: &EntityRef) -> Option<&EventRecord> {
        self.events.get(entity)
    }

    /// Get an event's registration settings.
    #[must_use]
    pub fn event_settings(&self, entity: &EntityRef) -> Option<&EventSettings> {
        self.events.get(entity).map(|record| &record.settings)
    }

    /// Replace an event's registration settings.
    pub fn set_event_settings(
        &mut self,
        entity: &EntityRef,
        settings: EventSettings,
    ) -> Result<(), Error> {
        let record = self.events.get_mut(entity).ok_or_else(|| Error::NotFound {
            kind: "event",
            id: entity.to_string(),
        })?;
        record.settings = settings;
        Ok(())
    }

    // === Identities ===

    /// Register an identity projection.
    pub fn insert_identity(&mut self, entity: EntityRef, identity: Identity) {
        self.identities.insert(entity, identity);
    }

    /// Get an identity projection.
    #[must_use]
    pub fn identity(&self, entity: &EntityRef) -> Option<&Identity> {
        self.identities.get(entity)
    }

    /// Identities of one entity type, ascending by id.
    pub fn identities_of_type<'a>(
        &'a self,
        entity_type: &'a str,
    ) -> impl Iterator<Item = (&'a EntityRef, &'a Identity)> {
        self.identities
            .iter()
            .filter(move |(entity, _)| entity.entity_type == entity_type)
    }

    /// Find the first identity with the given email, in ascending entity
    /// order.
    #[must_use]
    pub fn find_identity_by_email(&self, email: &str) -> Option<EntityRef> {
        self.identities
            .iter()
            .find(|(_, identity)| identity.email.as_deref() == Some(email))
            .map(|(entity, _)| entity.clone())
    }

    /// Replace an identity's field data.
    ///
    /// This is a plain write: it does not run registrant sync, so identity
    /// persistence from inside the pre-commit contract cannot cascade.
    pub fn update_identity_fields(
        &mut self,
        entity: &EntityRef,
        fields: Fields,
    ) -> Result<(), Error> {
        let identity = self.identities.get_mut(entity).ok_or_else(|| Error::NotFound {
            kind: "identity",
            id: entity.to_string(),
        })?;
        identity.fields = fields;
        Ok(())
    }

    // === Registrations ===

    /// Insert a registration, assigning its id and attaching the event's
    /// default groups through the constraint-checked path.
    ///
    /// Capacity is deliberately not enforced here: callers gate on
    /// `EventMeta::remaining_registration_capacity` before creating one.
    pub fn insert_registration(&mut self, mut registration: Registration) -> Result<RegistrationId, Error> {
        if !registration.id.is_saved() {
            self.next_registration += 1;
            registration.id = RegistrationId::new(self.next_registration);
        } else if registration.id.raw() > self.next_registration {
            self.next_registration = registration.id.raw();
        }
        let id = registration.id;

        let default_groups = self
            .event_settings(&registration.event)
            .map(|settings| settings.default_groups.clone())
            .unwrap_or_default();

        self.registrations.insert(id, registration);
        for group in default_groups {
            self.add_registration_group(id, group)?;
        }
        Ok(id)
    }

    /// Get a registration.
    #[must_use]
    pub fn registration(&self, id: RegistrationId) -> Option<&Registration> {
        self.registrations.get(&id)
    }

    /// Replace a registration.
    pub fn update_registration(&mut self, registration: Registration) -> Result<(), Error> {
        if !self.registrations.contains_key(&registration.id) {
            return Err(Error::NotFound {
                kind: "registration",
                id: registration.id.to_string(),
            });
        }
        self.registrations.insert(registration.id, registration);
        Ok(())
    }

    /// Remove a registration and every registrant slot it owns.
    pub fn remove_registration(&mut self, id: RegistrationId) -> Result<(), Error> {
        if self.registrations.remove(&id).is_none() {
            return Err(Error::NotFound {
                kind: "registration",
                id: id.to_string(),
            });
        }
        let orphaned: Vec<RegistrantId> = self
            .registrants
            .iter()
            .filter(|(_, r)| r.registration == Some(id))
            .map(|(rid, _)| *rid)
            .collect();
        for registrant in &orphaned {
            self.registrants.remove(registrant);
        }
        debug!(registration = %id, removed = orphaned.len(), "removed registration and its registrants");
        Ok(())
    }

    /// Registrations against one event, ascending by id.
    #[must_use]
    pub fn registrations_for_event(&self, event: &EntityRef) -> Vec<&Registration> {
        self.registrations
            .values()
            .filter(|r| &r.event == event)
            .collect()
    }

    /// Count registrations against one event.
    #[must_use]
    pub fn count_registrations_for_event(&self, event: &EntityRef) -> u32 {
        self.registrations_for_event(event).len() as u32
    }

    // === Registrants ===

    /// Insert a registrant slot.
    ///
    /// Enforces the owning registration's quantity cap, then runs the
    /// pre-commit contract (validation, auto-attach, sync), all before
    /// anything is persisted.
    pub fn insert_registrant(
        &mut self,
        mut registrant: Registrant,
        types: &EventManager,
    ) -> Result<RegistrantId, Error> {
        if let Some(registration) = registrant.registration.and_then(|id| self.registration(id)) {
            let held = self.registrants_for_registration(registration.id).len() as u32;
            if !registration.can_add_registrants(held, 1) {
                return Err(Error::MaxRegistrantsExceeded {
                    registration: registration.id,
                    quantity: registration.registrant_qty,
                });
            }
        }

        pre_commit(&mut registrant, self, types)?;

        if !registrant.id.is_saved() {
            self.next_registrant += 1;
            registrant.id = RegistrantId::new(self.next_registrant);
        } else if registrant.id.raw() > self.next_registrant {
            self.next_registrant = registrant.id.raw();
        }
        let id = registrant.id;
        self.registrants.insert(id, registrant);
        Ok(id)
    }

    /// Replace a registrant slot, re-running the pre-commit contract.
    pub fn update_registrant(
        &mut self,
        mut registrant: Registrant,
        types: &EventManager,
    ) -> Result<(), Error> {
        if !self.registrants.contains_key(&registrant.id) {
            return Err(Error::NotFound {
                kind: "registrant",
                id: registrant.id.to_string(),
            });
        }
        pre_commit(&mut registrant, self, types)?;
        self.registrants.insert(registrant.id, registrant);
        Ok(())
    }

    /// Get a registrant slot.
    #[must_use]
    pub fn registrant(&self, id: RegistrantId) -> Option<&Registrant> {
        self.registrants.get(&id)
    }

    /// Remove a registrant slot.
    pub fn remove_registrant(&mut self, id: RegistrantId) -> Result<(), Error> {
        self.registrants.remove(&id).map(|_| ()).ok_or(Error::NotFound {
            kind: "registrant",
            id: id.to_string(),
        })
    }

    /// Registrant slots of one registration, ascending by id.
    #[must_use]
    pub fn registrants_for_registration(&self, registration: RegistrationId) -> Vec<&Registrant> {
        self.registrants
            .values()
            .filter(|r| r.registration == Some(registration))
            .collect()
    }

    /// Registrant slots across all of an event's registrations (joined
    /// through the registration table), ascending by id.
    #[must_use]
    pub fn registrants_for_event(&self, event: &EntityRef) -> Vec<&Registrant> {
        self.registrants
            .values()
            .filter(|registrant| {
                registrant
                    .registration
                    .and_then(|id| self.registration(id))
                    .is_some_and(|registration| &registration.event == event)
            })
            .collect()
    }

    /// Live registrant count for one event.
    ///
    /// With `confirmed_only`, registrants of unconfirmed registrations do
    /// not count against capacity.
    #[must_use]
    pub fn count_registrants_for_event(&self, event: &EntityRef, confirmed_only: bool) -> u32 {
        self.registrants
            .values()
            .filter(|registrant| {
                registrant
                    .registration
                    .and_then(|id| self.registration(id))
                    .is_some_and(|registration| {
                        &registration.event == event
                            && (!confirmed_only || registration.confirmed)
                    })
            })
            .count() as u32
    }

    /// Registrant slots held by one identity, ascending by id.
    #[must_use]
    pub fn registrant_ids_for_identity(&self, identity: &EntityRef) -> Vec<RegistrantId> {
        self.registrants
            .iter()
            .filter(|(_, registrant)| registrant.has_identity(identity))
            .map(|(id, _)| *id)
            .collect()
    }

    // === Groups ===

    /// Insert a group, assigning its id.
    pub fn insert_group(&mut self, mut group: Group) -> GroupId {
        if !group.id.is_saved() {
            self.next_group += 1;
            group.id = GroupId::new(self.next_group);
        } else if group.id.raw() > self.next_group {
            self.next_group = group.id.raw();
        }
        let id = group.id;
        self.groups.insert(id, group);
        id
    }

    /// Get a group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Groups of one event, ascending by id.
    #[must_use]
    pub fn groups_for_event(&self, event: &EntityRef) -> Vec<&Group> {
        self.groups.values().filter(|g| &g.event == event).collect()
    }

    /// Attach a group to a registration, validating dependencies and
    /// conflicts at the point of mutation.
    pub fn add_registration_group(
        &mut self,
        registration: RegistrationId,
        group: GroupId,
    ) -> Result<(), Error> {
        let group_record = self.group(group).cloned().ok_or(Error::NotFound {
            kind: "group",
            id: group.to_string(),
        })?;
        let record = self
            .registrations
            .get_mut(&registration)
            .ok_or_else(|| Error::NotFound {
                kind: "registration",
                id: registration.to_string(),
            })?;

        group_record.check_add(&record.groups)?;
        if !record.groups.contains(&group) {
            record.groups.push(group);
        }
        Ok(())
    }

    /// Detach a group from a registration, rejecting the removal while a
    /// remaining attached group depends on it.
    pub fn remove_registration_group(
        &mut self,
        registration: RegistrationId,
        group: GroupId,
    ) -> Result<(), Error> {
        let attached = self
            .registration(registration)
            .ok_or_else(|| Error::NotFound {
                kind: "registration",
                id: registration.to_string(),
            })?
            .groups
            .clone();

        if !attached.contains(&group) {
            return Err(GroupConstraintError::NotAttached { group }.into());
        }
        for other in attached.iter().filter(|g| **g != group) {
            if let Some(record) = self.group(*other) {
                if record.dependent_groups.contains(&group) {
                    return Err(GroupConstraintError::HasDependents {
                        group,
                        dependent: *other,
                    }
                    .into());
                }
            }
        }

        let record = self
            .registrations
            .get_mut(&registration)
            .ok_or_else(|| Error::NotFound {
                kind: "registration",
                id: registration.to_string(),
            })?;
        record.groups.retain(|g| *g != group);
        Ok(())
    }

    // === Rules ===

    /// Insert a rule, assigning ids to the rule and any unsaved components.
    pub fn insert_rule(&mut self, mut rule: Rule) -> RuleId {
        if !rule.id.is_saved() {
            self.next_rule += 1;
            rule.id = RuleId::new(self.next_rule);
        } else if rule.id.raw() > self.next_rule {
            self.next_rule = rule.id.raw();
        }
        for component in &mut rule.components {
            if !component.id.is_saved() {
                self.next_component += 1;
                component.id = ComponentId::new(self.next_component);
            } else if component.id.raw() > self.next_component {
                self.next_component = component.id.raw();
            }
        }
        let id = rule.id;
        self.rules.insert(id, rule);
        id
    }

    /// Get a rule.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Remove a rule.
    pub fn remove_rule(&mut self, id: RuleId) -> Result<(), Error> {
        self.rules.remove(&id).map(|_| ()).ok_or(Error::NotFound {
            kind: "rule",
            id: id.to_string(),
        })
    }

    /// Rules of one event, optionally filtered by trigger id and active
    /// flag, ascending by id.
    #[must_use]
    pub fn rules_for_event(
        &self,
        event: &EntityRef,
        trigger: Option<&str>,
        active: Option<bool>,
    ) -> Vec<&Rule> {
        self.rules
            .values()
            .filter(|rule| &rule.event == event)
            .filter(|rule| trigger.is_none_or(|t| rule.trigger_id == t))
            .filter(|rule| active.is_none_or(|a| rule.active == a))
            .collect()
    }

    /// Write one configuration key on a stored rule component.
    ///
    /// This is the second half of the two-phase component setup: insert the
    /// rule to learn the component's id, then write derived configuration
    /// (such as the id itself) back into it.
    pub fn set_rule_component_config(
        &mut self,
        rule: RuleId,
        component: ComponentId,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), Error> {
        let record = self.rules.get_mut(&rule).ok_or_else(|| Error::NotFound {
            kind: "rule",
            id: rule.to_string(),
        })?;
        let slot = record
            .components
            .iter_mut()
            .find(|c| c.id == component)
            .ok_or_else(|| Error::NotFound {
                kind: "rule component",
                id: component.to_string(),
            })?;
        slot.configuration.insert(key.into(), value);
        Ok(())
    }
}
