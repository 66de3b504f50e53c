//! EventMeta: the per-event facade.
//!
//! An `EventMeta` binds one event entity to its resolved [`EventType`] and a
//! snapshot of the [`SystemConfig`]. It answers capacity and identity
//! eligibility questions, loads rules, and runs trigger passes. Query
//! methods read the store on every call; the only caching is the meta
//! instance itself, memoized by the [`EventManager`](super::EventManager)
//! until explicitly invalidated.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::warn;

use crate::core::{Capacity, EntityRef, GroupId, RuleId, SystemConfig};
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::events::{EventSettings, EventType};
use crate::groups::Group;
use crate::identity::{IdentitySelection, IdentityTypeId};
use crate::registration::{Registrant, Registration};
use crate::rules::{
    builtin, defaults, triggers, ActionContext, EvalContext, PluginRegistry, Rule, RuleContext,
    TriggerReport,
};
use crate::store::RecordStore;

/// Facade over one event entity and its registration policy.
#[derive(Clone, Debug)]
pub struct EventMeta {
    event: EntityRef,
    event_type: EventType,
    config: SystemConfig,
}

impl EventMeta {
    pub(crate) fn new(event: EntityRef, event_type: EventType, config: SystemConfig) -> Self {
        Self {
            event,
            event_type,
            config,
        }
    }

    /// The event entity this meta is bound to.
    #[must_use]
    pub fn event(&self) -> &EntityRef {
        &self.event
    }

    /// The resolved event type.
    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    fn settings<'a>(&self, store: &'a RecordStore) -> Option<&'a EventSettings> {
        store.event_settings(&self.event)
    }

    // === Settings reads ===

    /// Whether the event currently accepts new registrations.
    #[must_use]
    pub fn is_accepting_registrations(&self, store: &RecordStore) -> bool {
        self.settings(store)
            .is_some_and(|s| s.accepting_registrations)
    }

    /// Whether one identity may occupy several registrant slots.
    #[must_use]
    pub fn allow_duplicate_registrants(&self, store: &RecordStore) -> bool {
        self.settings(store)
            .is_some_and(|s| s.allow_duplicate_registrants)
    }

    /// Whether registrations past capacity may wait-list.
    #[must_use]
    pub fn allow_wait_list(&self, store: &RecordStore) -> bool {
        self.settings(store).is_some_and(|s| s.allow_wait_list)
    }

    /// Reply-to address for messages sent from this event.
    #[must_use]
    pub fn reply_to(&self, store: &RecordStore) -> Option<String> {
        self.settings(store).and_then(|s| s.reply_to.clone())
    }

    // === Capacity ===

    /// Configured ceiling on registrations.
    #[must_use]
    pub fn registration_capacity(&self, store: &RecordStore) -> Capacity {
        self.settings(store)
            .map_or(Capacity::Unlimited, |s| s.registration_capacity)
    }

    /// How many more registrations fit. Never negative: excess
    /// registrations clamp to zero.
    #[must_use]
    pub fn remaining_registration_capacity(&self, store: &RecordStore) -> Capacity {
        self.registration_capacity(store)
            .remaining(self.count_registrations(store))
    }

    /// Configured ceiling on registrant slots.
    #[must_use]
    pub fn registrant_capacity(&self, store: &RecordStore) -> Capacity {
        self.settings(store)
            .map_or(Capacity::Unlimited, |s| s.registrant_capacity)
    }

    /// How many more registrant slots fit.
    #[must_use]
    pub fn remaining_registrant_capacity(&self, store: &RecordStore) -> Capacity {
        self.registrant_capacity(store)
            .remaining(self.count_registrants(store))
    }

    /// Live registration count.
    #[must_use]
    pub fn count_registrations(&self, store: &RecordStore) -> u32 {
        store.count_registrations_for_event(&self.event)
    }

    /// Live registrant count, joined through registrations. Honors the
    /// event's confirmed-only counting flag.
    #[must_use]
    pub fn count_registrants(&self, store: &RecordStore) -> u32 {
        let confirmed_only = self.settings(store).is_some_and(|s| s.capacity_confirmed_only);
        store.count_registrants_for_event(&self.event, confirmed_only)
    }

    // === Record loads ===

    /// All registrations against this event.
    #[must_use]
    pub fn registrations<'a>(&self, store: &'a RecordStore) -> Vec<&'a Registration> {
        store.registrations_for_event(&self.event)
    }

    /// All registrant slots across this event's registrations.
    #[must_use]
    pub fn registrants<'a>(&self, store: &'a RecordStore) -> Vec<&'a Registrant> {
        store.registrants_for_event(&self.event)
    }

    /// All groups scoped to this event.
    #[must_use]
    pub fn groups<'a>(&self, store: &'a RecordStore) -> Vec<&'a Group> {
        store.groups_for_event(&self.event)
    }

    /// Groups attached to every new registration.
    #[must_use]
    pub fn default_groups(&self, store: &RecordStore) -> Vec<GroupId> {
        self.settings(store)
            .map(|s| s.default_groups.to_vec())
            .unwrap_or_default()
    }

    // === Identity eligibility ===

    /// Identity types that may be referenced for this event: the global
    /// list intersected with the event type's permission matrix. Matrix
    /// entries naming undeclared types are silently dropped.
    #[must_use]
    pub fn identity_types(&self) -> Vec<IdentityTypeId> {
        self.config
            .identity_types
            .iter()
            .filter(|t| self.event_type.can_identity_type_reference(t))
            .cloned()
            .collect()
    }

    /// Identity types that may be created while registering, filtered the
    /// same way.
    #[must_use]
    pub fn creatable_identity_types(&self) -> Vec<IdentityTypeId> {
        self.config
            .identity_types
            .iter()
            .filter(|t| self.event_type.can_identity_type_create(t))
            .cloned()
            .collect()
    }

    /// Whether the caller can put any identity on a registration: able to
    /// create one (configuration only, checked first), or able to
    /// reference at least one existing identity.
    #[must_use]
    pub fn can_register_proxy_identities(&self, selection: &dyn IdentitySelection) -> bool {
        if !self.creatable_identity_types().is_empty() {
            return true;
        }
        self.identity_types()
            .iter()
            .any(|t| selection.count_referenceable(&t.entity_type, Some(&t.bundle)) > 0)
    }

    /// Count existing identities the caller could reference.
    #[must_use]
    pub fn count_proxy_identities(&self, selection: &dyn IdentitySelection) -> usize {
        self.identity_types()
            .iter()
            .map(|t| selection.count_referenceable(&t.entity_type, Some(&t.bundle)))
            .sum()
    }

    /// Which of `ids` may register, per the selection collaborator.
    #[must_use]
    pub fn identities_can_register(
        &self,
        selection: &dyn IdentitySelection,
        entity_type: &str,
        ids: &[u32],
    ) -> Vec<u32> {
        selection.filter_referenceable(entity_type, ids)
    }

    // === Rules ===

    /// Whether this event runs on site default rules for a trigger: its
    /// type forbids custom rules, or it has none persisted.
    #[must_use]
    pub fn uses_default_rules(&self, store: &RecordStore, trigger: &str) -> bool {
        !self.event_type.allow_custom_rules
            || store
                .rules_for_event(&self.event, Some(trigger), None)
                .is_empty()
    }

    /// Load rules for this event.
    ///
    /// Returns persisted rules matching the filters. When the event runs on
    /// defaults for `trigger` and `use_defaults_if_empty` is set, returns
    /// transient unsaved rules built from the site templates instead —
    /// never persisted by this call, and never mixed with persisted rules.
    #[must_use]
    pub fn rules(
        &self,
        store: &RecordStore,
        trigger: Option<&str>,
        use_defaults_if_empty: bool,
        active_only: bool,
    ) -> Vec<Rule> {
        if use_defaults_if_empty {
            if let Some(trigger) = trigger {
                if self.uses_default_rules(store, trigger) {
                    return defaults::default_rules(&self.event, trigger);
                }
            }
        }
        store
            .rules_for_event(&self.event, trigger, active_only.then_some(true))
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run one trigger pass.
    ///
    /// The context's event is overwritten with this meta's event. Every
    /// active persisted rule on `trigger_id` is evaluated in stable id
    /// order; a rule with no conditions fires unconditionally. Actions run
    /// in definition order with the shared context. The pass is stateless:
    /// nothing remembers prior firings, so callers decide when a lifecycle
    /// point has genuinely been crossed.
    ///
    /// Failures stay contained: an unresolvable condition or action plugin
    /// abandons that rule alone, and a failing action neither rolls back
    /// the triggering write nor stops its siblings.
    pub fn trigger(
        &self,
        store: &RecordStore,
        plugins: &PluginRegistry,
        dispatcher: &mut dyn Dispatcher,
        trigger_id: &str,
        mut ctx: RuleContext,
    ) -> TriggerReport {
        ctx.event = self.event.clone();

        let rules: Vec<Rule> = store
            .rules_for_event(&self.event, Some(trigger_id), Some(true))
            .into_iter()
            .cloned()
            .collect();

        let mut report = TriggerReport {
            rules_matched: rules.len(),
            ..TriggerReport::default()
        };
        let mut grants = BTreeSet::new();

        for rule in &rules {
            let eval = EvalContext { store, ctx: &ctx };
            match rule.evaluate_conditions(plugins, &eval) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    warn!(rule = %rule.id, %error, "skipping rule with unresolvable condition");
                    continue;
                }
            }

            report.rules_fired += 1;
            for component in rule.actions() {
                let action = match plugins.resolve_action(&component.plugin_id) {
                    Ok(action) => action,
                    Err(error) => {
                        warn!(rule = %rule.id, %error, "abandoning rule with unresolvable action");
                        report.actions_failed += 1;
                        break;
                    }
                };
                let mut action_ctx = ActionContext {
                    store,
                    ctx: &ctx,
                    dispatcher: &mut *dispatcher,
                    grants: &mut grants,
                };
                if let Err(error) = action.execute(&component.configuration, &mut action_ctx) {
                    warn!(
                        rule = %rule.id,
                        plugin = %component.plugin_id,
                        %error,
                        "action failed; continuing"
                    );
                    report.actions_failed += 1;
                }
            }
        }

        report.grants = grants;
        report
    }

    /// Persist the fixed default access rules for this event.
    ///
    /// If the site defaults change later, rules created here do not follow.
    pub fn add_default_access(&self, store: &mut RecordStore) -> Vec<RuleId> {
        defaults::default_access_rules(&self.event)
            .into_iter()
            .map(|rule| store.insert_rule(rule))
            .collect()
    }

    /// Create message rules from the event type's default message
    /// templates.
    ///
    /// Custom-date templates get a scheduling condition whose configuration
    /// must name its own component id; the id only exists after insertion,
    /// so the rule is inserted first and the id written back second.
    pub fn create_default_event_messages(
        &self,
        store: &mut RecordStore,
    ) -> Result<Vec<RuleId>, Error> {
        let mut created = Vec::new();
        for message in self.event_type.default_messages() {
            let rule_id = store.insert_rule(defaults::message_rule(&self.event, message));

            if message.trigger == triggers::DATE_CUSTOM {
                let schedule_component = store.rule(rule_id).and_then(|rule| {
                    rule.conditions()
                        .find(|c| c.plugin_id == builtin::RULE_SCHEDULE)
                        .map(|c| c.id)
                });
                if let Some(component) = schedule_component {
                    store.set_rule_component_config(
                        rule_id,
                        component,
                        "component",
                        json!(component.raw()),
                    )?;
                }
            }
            created.push(rule_id);
        }
        Ok(created)
    }
}
