//! Group dependency/conflict integration tests.

use chrono::DateTime;

use regkit::{
    EntityRef, Error, EventSettings, Group, GroupConstraintError, GroupId, RecordStore,
    Registration, RegistrationId,
};

fn event() -> EntityRef {
    EntityRef::new("node", 1)
}

fn setup() -> (RecordStore, RegistrationId) {
    let mut store = RecordStore::new();
    store.insert_event(event(), "conference", EventSettings::new());
    let registration = store
        .insert_registration(Registration::new(event(), DateTime::UNIX_EPOCH))
        .unwrap();
    (store, registration)
}

#[test]
fn test_add_and_remove_unconstrained_group() {
    let (mut store, registration) = setup();
    let speakers = store.insert_group(Group::new(event(), "speakers"));

    store.add_registration_group(registration, speakers).unwrap();
    assert!(store.registration(registration).unwrap().has_group(speakers));

    store.remove_registration_group(registration, speakers).unwrap();
    assert!(!store.registration(registration).unwrap().has_group(speakers));
}

#[test]
fn test_dependency_must_be_present_first() {
    let (mut store, registration) = setup();
    let vip = store.insert_group(Group::new(event(), "vip"));
    let backstage = store.insert_group(Group::new(event(), "backstage").with_dependency(vip));

    let err = store
        .add_registration_group(registration, backstage)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::GroupConstraint(GroupConstraintError::MissingDependency { requires, .. })
            if requires == vip
    ));

    store.add_registration_group(registration, vip).unwrap();
    store.add_registration_group(registration, backstage).unwrap();
}

#[test]
fn test_conflicting_group_rejected() {
    let (mut store, registration) = setup();
    let online = store.insert_group(Group::new(event(), "online"));
    let in_person = store.insert_group(Group::new(event(), "in-person").with_conflict(online));

    store.add_registration_group(registration, online).unwrap();

    let err = store
        .add_registration_group(registration, in_person)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::GroupConstraint(GroupConstraintError::Conflicting { conflicts_with, .. })
            if conflicts_with == online
    ));
}

#[test]
fn test_removal_blocked_while_dependents_remain() {
    let (mut store, registration) = setup();
    let vip = store.insert_group(Group::new(event(), "vip"));
    let backstage = store.insert_group(Group::new(event(), "backstage").with_dependency(vip));

    store.add_registration_group(registration, vip).unwrap();
    store.add_registration_group(registration, backstage).unwrap();

    let err = store.remove_registration_group(registration, vip).unwrap_err();
    assert!(matches!(
        err,
        Error::GroupConstraint(GroupConstraintError::HasDependents { dependent, .. })
            if dependent == backstage
    ));

    // Detach the dependent first, then the removal goes through.
    store
        .remove_registration_group(registration, backstage)
        .unwrap();
    store.remove_registration_group(registration, vip).unwrap();
}

#[test]
fn test_removing_unattached_group_fails_loudly() {
    let (mut store, registration) = setup();
    let speakers = store.insert_group(Group::new(event(), "speakers"));

    let err = store
        .remove_registration_group(registration, speakers)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::GroupConstraint(GroupConstraintError::NotAttached { group }) if group == speakers
    ));
}

#[test]
fn test_pure_predicate_matches_mutating_path() {
    let vip = GroupId::new(1);
    let group = Group::new(event(), "backstage").with_dependency(vip);

    assert!(!group.can_add(&[]));
    assert!(group.can_add(&[vip]));
}

#[test]
fn test_default_groups_attached_to_new_registrations() {
    let mut store = RecordStore::new();
    let walk_in = store.insert_group(Group::new(event(), "walk-in"));
    store.insert_event(
        event(),
        "conference",
        EventSettings::new().with_default_group(walk_in),
    );

    let registration = store
        .insert_registration(Registration::new(event(), DateTime::UNIX_EPOCH))
        .unwrap();
    assert!(store.registration(registration).unwrap().has_group(walk_in));
}
