//! Evaluation and execution contexts for rule passes.
//!
//! A [`RuleContext`] carries the facts a trigger pass evaluates against: the
//! event (always set by the pass itself), the registration and identity in
//! play, what the acting user holds, and the clock. The engine never reads
//! the wall clock; callers supply `now`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::core::{EntityRef, RegistrationId};
use crate::dispatch::Dispatcher;
use crate::store::RecordStore;

/// Facts shared by every rule evaluated in one trigger pass.
#[derive(Clone, Debug)]
pub struct RuleContext {
    /// The event the pass is bound to. Overwritten by
    /// [`EventMeta::trigger`](crate::events::EventMeta::trigger).
    pub event: EntityRef,
    /// The registration in play, if any.
    pub registration: Option<RegistrationId>,
    /// The identity in play, if any.
    pub identity: Option<EntityRef>,
    /// Roles held by the acting user.
    pub actor_roles: Vec<String>,
    /// Operations the acting user holds on the event.
    pub actor_event_operations: Vec<String>,
    /// Evaluation clock.
    pub now: DateTime<Utc>,
}

impl RuleContext {
    /// Create a context for an event at a point in time.
    pub fn new(event: EntityRef, now: DateTime<Utc>) -> Self {
        Self {
            event,
            registration: None,
            identity: None,
            actor_roles: Vec::new(),
            actor_event_operations: Vec::new(),
            now,
        }
    }

    /// Set the registration in play (builder pattern).
    #[must_use]
    pub fn with_registration(mut self, registration: RegistrationId) -> Self {
        self.registration = Some(registration);
        self
    }

    /// Set the identity in play (builder pattern).
    #[must_use]
    pub fn with_identity(mut self, identity: EntityRef) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Add an actor role (builder pattern).
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.actor_roles.push(role.into());
        self
    }

    /// Add an event operation the actor holds (builder pattern).
    #[must_use]
    pub fn with_event_operation(mut self, operation: impl Into<String>) -> Self {
        self.actor_event_operations.push(operation.into());
        self
    }
}

/// Read-only view handed to condition plugins.
pub struct EvalContext<'a> {
    /// The record store.
    pub store: &'a RecordStore,
    /// The shared pass context.
    pub ctx: &'a RuleContext,
}

/// Mutable view handed to action plugins.
///
/// Side effects run through the collaborators carried here; actions never
/// touch storage directly.
pub struct ActionContext<'a> {
    /// The record store.
    pub store: &'a RecordStore,
    /// The shared pass context.
    pub ctx: &'a RuleContext,
    /// Outbound message channel.
    pub dispatcher: &'a mut dyn Dispatcher,
    /// Operation grants accumulated across the pass.
    pub grants: &'a mut BTreeSet<String>,
}

/// What a trigger pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerReport {
    /// Rules loaded for the trigger id.
    pub rules_matched: usize,
    /// Rules whose conditions all held.
    pub rules_fired: usize,
    /// Actions that failed or named a missing plugin; failures are logged
    /// and isolated, never propagated.
    pub actions_failed: usize,
    /// Operation grants accumulated by access actions.
    pub grants: BTreeSet<String>,
}

impl TriggerReport {
    /// Whether an operation was granted during the pass.
    #[must_use]
    pub fn grants_operation(&self, operation: &str) -> bool {
        self.grants.contains(operation)
    }
}
