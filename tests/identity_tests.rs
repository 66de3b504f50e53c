//! Identity eligibility and selection integration tests.

use chrono::DateTime;

use regkit::{
    EntityRef, EventManager, EventMeta, EventSettings, EventType, Identity, IdentityTypeId,
    RecordStore, Registrant, Registration, StoreSelection, SystemConfig,
};

fn event() -> EntityRef {
    EntityRef::new("node", 1)
}

fn user_type() -> IdentityTypeId {
    IdentityTypeId::new("user", "user")
}

fn contact_type() -> IdentityTypeId {
    IdentityTypeId::new("contact", "person")
}

fn setup(event_type: EventType, settings: EventSettings) -> (RecordStore, EventManager, EventMeta) {
    let mut store = RecordStore::new();
    store.insert_event(event(), "conference", settings);
    for id in 10..13 {
        store.insert_identity(EntityRef::new("user", id), Identity::new("user"));
    }

    let config = SystemConfig::new()
        .with_identity_type("user", "user")
        .with_identity_type("contact", "person");
    let mut manager = EventManager::new(config);
    manager.register_event_type(event_type);
    let meta = manager.meta(&store, &event()).unwrap().clone();
    (store, manager, meta)
}

fn referencing_type() -> EventType {
    let mut event_type = EventType::new("node", "conference").with_allow_anon_registrants(true);
    event_type.set_identity_type_reference(user_type(), true);
    event_type
}

#[test]
fn test_identity_types_intersect_config_and_matrix() {
    let mut event_type = referencing_type();
    // A matrix entry for a type the site no longer declares: tolerated,
    // silently dropped.
    event_type.set_identity_type_reference(IdentityTypeId::new("bot", "bot"), true);
    let (_, _, meta) = setup(event_type, EventSettings::new());

    assert_eq!(meta.identity_types(), vec![user_type()]);
    assert!(meta.creatable_identity_types().is_empty());
}

#[test]
fn test_creatable_types_follow_create_permission() {
    let mut event_type = referencing_type();
    event_type.set_identity_type_create(contact_type(), true);
    let (_, _, meta) = setup(event_type, EventSettings::new());

    assert_eq!(meta.creatable_identity_types(), vec![contact_type()]);
}

#[test]
fn test_proxy_register_create_permission_wins_without_identities() {
    let mut event_type = EventType::new("node", "conference");
    event_type.set_identity_type_create(contact_type(), true);
    let (store, _, meta) = setup(event_type, EventSettings::new());

    // No contact identities exist, but create permission alone suffices.
    let selection = StoreSelection::for_event(&store, event());
    assert!(meta.can_register_proxy_identities(&selection));
}

#[test]
fn test_proxy_register_falls_back_to_referenceable_identities() {
    let (store, _, meta) = setup(referencing_type(), EventSettings::new());
    let selection = StoreSelection::for_event(&store, event());

    assert!(meta.can_register_proxy_identities(&selection));
    assert_eq!(meta.count_proxy_identities(&selection), 3);
}

#[test]
fn test_no_permissions_means_no_proxy_registration() {
    let (store, _, meta) = setup(
        EventType::new("node", "conference").with_allow_anon_registrants(true),
        EventSettings::new(),
    );
    let selection = StoreSelection::for_event(&store, event());

    assert!(!meta.can_register_proxy_identities(&selection));
    assert_eq!(meta.count_proxy_identities(&selection), 0);
}

#[test]
fn test_registered_identities_excluded_from_selection() {
    let (mut store, manager, meta) = setup(referencing_type(), EventSettings::new());
    let registration = store
        .insert_registration(Registration::new(event(), DateTime::UNIX_EPOCH))
        .unwrap();
    store
        .insert_registrant(
            Registrant::new(registration).with_identity(EntityRef::new("user", 10)),
            &manager,
        )
        .unwrap();

    let selection = StoreSelection::for_event(&store, event());
    assert_eq!(
        meta.identities_can_register(&selection, "user", &[10, 11, 12, 99]),
        vec![11, 12]
    );
    assert_eq!(meta.count_proxy_identities(&selection), 2);
}

#[test]
fn test_duplicates_allowed_keeps_registered_identities() {
    let (mut store, manager, meta) = setup(
        referencing_type(),
        EventSettings::new().with_allow_duplicates(true),
    );
    let registration = store
        .insert_registration(Registration::new(event(), DateTime::UNIX_EPOCH))
        .unwrap();
    store
        .insert_registrant(
            Registrant::new(registration).with_identity(EntityRef::new("user", 10)),
            &manager,
        )
        .unwrap();

    let selection = StoreSelection::for_event(&store, event());
    assert_eq!(
        meta.identities_can_register(&selection, "user", &[10, 11, 12]),
        vec![10, 11, 12]
    );
}
