//! Default rule synthesis and message rule creation.
//!
//! Events without their own rules run on transient site defaults; admins
//! can persist the default access set, and event types stamp out message
//! rules from their templates.

use chrono::{DateTime, Utc};
use serde_json::json;

use regkit::rules::{builtin, triggers};
use regkit::{
    DefaultMessage, EntityRef, EventManager, EventMeta, EventSettings, EventType, NullDispatcher,
    PluginRegistry, RecordStore, RuleContext, SystemConfig,
};

fn event() -> EntityRef {
    EntityRef::new("node", 1)
}

fn setup(event_type: EventType) -> (RecordStore, EventMeta) {
    let mut store = RecordStore::new();
    store.insert_event(event(), "conference", EventSettings::new());

    let mut manager = EventManager::new(SystemConfig::new());
    manager.register_event_type(event_type);
    let meta = manager.meta(&store, &event()).unwrap().clone();
    (store, meta)
}

fn base_type() -> EventType {
    EventType::new("node", "conference")
}

#[test]
fn test_transient_defaults_when_no_rules_persisted() {
    let (store, meta) = setup(base_type());

    let rules = meta.rules(&store, Some(triggers::EVENT_REGISTER), true, true);
    assert_eq!(rules.len(), 3);
    assert!(rules.iter().all(|r| !r.is_saved()));

    // Synthesis never persists anything.
    assert!(store
        .rules_for_event(&event(), Some(triggers::EVENT_REGISTER), None)
        .is_empty());
}

#[test]
fn test_defaults_not_synthesized_without_opt_in() {
    let (store, meta) = setup(base_type());
    assert!(meta
        .rules(&store, Some(triggers::EVENT_REGISTER), false, true)
        .is_empty());
}

#[test]
fn test_persisted_rules_shadow_defaults_entirely() {
    let (mut store, meta) = setup(base_type());
    meta.add_default_access(&mut store);

    let rules = meta.rules(&store, Some(triggers::EVENT_REGISTER), true, true);
    assert_eq!(rules.len(), 3);
    // All persisted, none transient: never a mix.
    assert!(rules.iter().all(|r| r.is_saved()));
    assert!(!meta.uses_default_rules(&store, triggers::EVENT_REGISTER));
}

#[test]
fn test_custom_rules_forbidden_forces_defaults() {
    let (mut store, meta) = setup(base_type().with_allow_custom_rules(false));
    meta.add_default_access(&mut store);

    assert!(meta.uses_default_rules(&store, triggers::EVENT_REGISTER));
    let rules = meta.rules(&store, Some(triggers::EVENT_REGISTER), true, true);
    assert!(rules.iter().all(|r| !r.is_saved()));
}

#[test]
fn test_persisted_default_access_grants() {
    let (mut store, meta) = setup(base_type());
    meta.add_default_access(&mut store);

    let plugins = PluginRegistry::with_builtins();
    let mut dispatcher = NullDispatcher;

    // Any actor may create a registration.
    let anyone = meta.trigger(
        &store,
        &plugins,
        &mut dispatcher,
        triggers::EVENT_REGISTER,
        RuleContext::new(event(), DateTime::UNIX_EPOCH),
    );
    assert!(anyone.grants_operation("create"));
    assert!(!anyone.grants_operation("delete"));

    // Event managers hold everything.
    let manager_pass = meta.trigger(
        &store,
        &plugins,
        &mut dispatcher,
        triggers::EVENT_REGISTER,
        RuleContext::new(event(), DateTime::UNIX_EPOCH).with_event_operation("manage event"),
    );
    for operation in ["create", "view", "update", "delete"] {
        assert!(manager_pass.grants_operation(operation));
    }
}

#[test]
fn test_message_rules_created_from_templates() {
    let event_type = base_type()
        .with_default_message(DefaultMessage::new(triggers::REGISTRATION_NEW, "welcome"))
        .with_default_message(
            DefaultMessage::new(triggers::REGISTRATION_UPDATE, "changed").with_active(false),
        );
    let (mut store, meta) = setup(event_type);

    let created = meta.create_default_event_messages(&mut store).unwrap();
    assert_eq!(created.len(), 2);

    let welcome = store.rule(created[0]).unwrap();
    assert_eq!(welcome.trigger_id, triggers::REGISTRATION_NEW);
    assert!(welcome.active);
    assert_eq!(welcome.conditions().count(), 0);
    let action = welcome.actions().next().unwrap();
    assert_eq!(action.plugin_id, builtin::SEND_MESSAGE);
    assert_eq!(action.configuration.get("template"), Some(&json!("welcome")));

    let changed = store.rule(created[1]).unwrap();
    assert!(!changed.active);
}

#[test]
fn test_custom_date_message_rule_references_its_own_component() {
    let date: DateTime<Utc> = "2026-09-01T08:00:00Z".parse().unwrap();
    let event_type = base_type().with_default_message(
        DefaultMessage::new(triggers::DATE_CUSTOM, "reminder").with_date(date),
    );
    let (mut store, meta) = setup(event_type);

    let created = meta.create_default_event_messages(&mut store).unwrap();
    let rule = store.rule(created[0]).unwrap();

    let schedule = rule
        .conditions()
        .find(|c| c.plugin_id == builtin::RULE_SCHEDULE)
        .unwrap();
    // Two-phase setup: the component's configuration names its own id,
    // which only existed after the rule was inserted.
    assert_eq!(
        schedule.configuration.get("component"),
        Some(&json!(schedule.id.raw()))
    );
    assert_eq!(
        schedule.configuration.get("date"),
        Some(&json!(date.to_rfc3339()))
    );
}
