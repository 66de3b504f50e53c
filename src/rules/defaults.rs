//! Site default rules and message templates.
//!
//! Builders here return in-memory, unsaved rules (id 0). Persisting them is
//! a separate, caller-invoked step: `EventMeta::rules` hands them out as
//! transient stand-ins when an event has no rules of its own, while
//! `EventMeta::add_default_access` and
//! `EventMeta::create_default_event_messages` write them through the store.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use serde::{Deserialize, Serialize};

use crate::core::EntityRef;
use crate::rules::builtin;
use crate::rules::rule::{Rule, RuleComponent};
use crate::rules::triggers;

/// A default message template carried by an event type.
///
/// New events get one rule per template; `date.custom` templates also get a
/// scheduling condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefaultMessage {
    /// The trigger the message rule listens on.
    pub trigger: String,
    /// Template name handed to the dispatcher.
    pub template: String,
    /// Whether the generated rule starts active.
    pub active: bool,
    /// Send date for `date.custom` templates.
    pub date: Option<DateTime<Utc>>,
}

impl DefaultMessage {
    /// Create an active template.
    pub fn new(trigger: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            template: template.into(),
            active: true,
            date: None,
        }
    }

    /// Set the active flag (builder pattern).
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the send date (builder pattern).
    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

fn operations(ops: &[&str]) -> Value {
    let mut map = serde_json::Map::new();
    for op in ops {
        map.insert((*op).to_string(), Value::Bool(true));
    }
    Value::Object(map)
}

/// The fixed default access rule set for one event.
///
/// Three rules on the registration-access trigger: anyone may create a
/// registration, registrants may view and update their own, and event
/// managers hold every operation.
#[must_use]
pub fn default_access_rules(event: &EntityRef) -> Vec<Rule> {
    let anyone = Rule::new(event.clone(), triggers::EVENT_REGISTER)
        .with_component(RuleComponent::condition(builtin::USER_ROLE).with_config("roles", json!([])))
        .with_component(
            RuleComponent::action(builtin::REGISTRATION_OPERATIONS)
                .with_config("operations", operations(&["create"])),
        );

    let registrant = Rule::new(event.clone(), triggers::EVENT_REGISTER)
        .with_component(RuleComponent::condition(builtin::REGISTRATION_IDENTITY))
        .with_component(
            RuleComponent::action(builtin::REGISTRATION_OPERATIONS)
                .with_config("operations", operations(&["view", "update"])),
        );

    let manager = Rule::new(event.clone(), triggers::EVENT_REGISTER)
        .with_component(
            RuleComponent::condition(builtin::EVENT_OPERATION)
                .with_config("operations", operations(&["manage event"])),
        )
        .with_component(
            RuleComponent::action(builtin::REGISTRATION_OPERATIONS)
                .with_config("operations", operations(&["create", "view", "update", "delete"])),
        );

    vec![anyone, registrant, manager]
}

/// Transient default rules for a trigger, or empty when the site defines
/// none for it.
#[must_use]
pub fn default_rules(event: &EntityRef, trigger: &str) -> Vec<Rule> {
    match trigger {
        triggers::EVENT_REGISTER => default_access_rules(event),
        _ => Vec::new(),
    }
}

/// Build the unsaved rule for one default message template.
///
/// `date.custom` templates carry a `rule_schedule` condition; its
/// self-referencing `component` key is written after insertion, once the
/// component id is known.
#[must_use]
pub fn message_rule(event: &EntityRef, message: &DefaultMessage) -> Rule {
    let mut rule = Rule::new(event.clone(), message.trigger.clone()).with_active(message.active);

    if message.trigger == triggers::DATE_CUSTOM {
        let mut schedule = RuleComponent::condition(builtin::RULE_SCHEDULE);
        if let Some(date) = message.date {
            schedule = schedule.with_config("date", json!(date.to_rfc3339()));
        }
        rule = rule.with_component(schedule);
    }

    rule.with_component(
        RuleComponent::action(builtin::SEND_MESSAGE)
            .with_config("template", json!(message.template)),
    )
}
