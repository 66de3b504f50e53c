//! Event type configuration.
//!
//! An [`EventType`] declares that one (entity type, bundle) pair hosts
//! registrations, and carries the policy applied to every event in that
//! bundle: anonymous/auto-sync/auto-attach behavior for registrants, the
//! identity permission matrix, and default message templates cloned onto new
//! events. At most one event type exists per pair; the
//! [`EventManager`](crate::events::EventManager) enforces this.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityTypeId;
use crate::rules::DefaultMessage;

/// Per-identity-type permissions on an event type.
///
/// `form_mode` names the inline form presentation used when an identity of
/// this type is created in place; the engine stores it opaquely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTypePermission {
    /// The identity type this entry covers.
    pub identity_type: IdentityTypeId,
    /// Whether new identities of this type may be created while registering.
    pub can_create: bool,
    /// Whether existing identities of this type may be referenced.
    pub can_reference: bool,
    /// Inline form mode for in-place creation.
    pub form_mode: String,
}

impl IdentityTypePermission {
    fn new(identity_type: IdentityTypeId) -> Self {
        Self {
            identity_type,
            can_create: false,
            can_reference: false,
            form_mode: "default".to_string(),
        }
    }
}

/// Policy for one (entity type, bundle) pair declared as an event host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    entity_type: String,
    bundle: String,

    /// Whether registrants may exist without an identity.
    pub allow_anon_registrants: bool,
    /// Whether shared registrant/identity fields are synced on save.
    pub auto_sync_registrants: bool,
    /// Whether identity-less registrants are matched to identities by email.
    pub auto_attach_identities: bool,
    /// Registrant field read for the auto-attach email lookup.
    pub registrant_email_field: Option<String>,
    /// Bundle assigned to registrants created without an explicit one.
    pub default_registrant_bundle: Option<String>,
    /// Whether events of this type may carry their own rules instead of the
    /// site defaults.
    pub allow_custom_rules: bool,

    people_types: Vec<IdentityTypePermission>,
    default_messages: Vec<DefaultMessage>,
}

impl EventType {
    /// Create an event type for an (entity type, bundle) pair.
    pub fn new(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            allow_anon_registrants: false,
            auto_sync_registrants: false,
            auto_attach_identities: false,
            registrant_email_field: None,
            default_registrant_bundle: None,
            allow_custom_rules: true,
            people_types: Vec::new(),
            default_messages: Vec::new(),
        }
    }

    /// Two-part id, `{entity_type}.{bundle}`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}.{}", self.entity_type, self.bundle)
    }

    /// The hosting entity type.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The hosting bundle.
    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Set anonymous registrant policy (builder pattern).
    #[must_use]
    pub fn with_allow_anon_registrants(mut self, allow: bool) -> Self {
        self.allow_anon_registrants = allow;
        self
    }

    /// Set field sync policy (builder pattern).
    #[must_use]
    pub fn with_auto_sync_registrants(mut self, sync: bool) -> Self {
        self.auto_sync_registrants = sync;
        self
    }

    /// Enable email auto-attach against the named registrant field
    /// (builder pattern).
    #[must_use]
    pub fn with_auto_attach(mut self, email_field: impl Into<String>) -> Self {
        self.auto_attach_identities = true;
        self.registrant_email_field = Some(email_field.into());
        self
    }

    /// Set the default registrant bundle (builder pattern).
    #[must_use]
    pub fn with_default_registrant_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.default_registrant_bundle = Some(bundle.into());
        self
    }

    /// Set whether events may customize rules (builder pattern).
    #[must_use]
    pub fn with_allow_custom_rules(mut self, allow: bool) -> Self {
        self.allow_custom_rules = allow;
        self
    }

    /// Add a default message template (builder pattern).
    #[must_use]
    pub fn with_default_message(mut self, message: DefaultMessage) -> Self {
        self.default_messages.push(message);
        self
    }

    /// Default message templates for this event type.
    #[must_use]
    pub fn default_messages(&self) -> &[DefaultMessage] {
        &self.default_messages
    }

    /// Replace the default message templates.
    pub fn set_default_messages(&mut self, messages: Vec<DefaultMessage>) {
        self.default_messages = messages;
    }

    /// Whether identities of the given type may be created while
    /// registering.
    #[must_use]
    pub fn can_identity_type_create(&self, identity_type: &IdentityTypeId) -> bool {
        self.permission(identity_type).is_some_and(|p| p.can_create)
    }

    /// Whether existing identities of the given type may be referenced.
    #[must_use]
    pub fn can_identity_type_reference(&self, identity_type: &IdentityTypeId) -> bool {
        self.permission(identity_type).is_some_and(|p| p.can_reference)
    }

    /// Inline form mode for the given identity type, `"default"` when unset.
    #[must_use]
    pub fn identity_type_form_mode(&self, identity_type: &IdentityTypeId) -> &str {
        self.permission(identity_type)
            .map_or("default", |p| p.form_mode.as_str())
    }

    /// Allow creation of the given identity type.
    pub fn set_identity_type_create(&mut self, identity_type: IdentityTypeId, enabled: bool) {
        self.permission_mut(identity_type).can_create = enabled;
    }

    /// Allow referencing existing identities of the given type.
    pub fn set_identity_type_reference(&mut self, identity_type: IdentityTypeId, enabled: bool) {
        self.permission_mut(identity_type).can_reference = enabled;
    }

    /// Set the inline form mode for the given identity type.
    pub fn set_identity_type_form_mode(
        &mut self,
        identity_type: IdentityTypeId,
        form_mode: impl Into<String>,
    ) {
        self.permission_mut(identity_type).form_mode = form_mode.into();
    }

    /// Identity types with reference permission, in declaration order.
    pub fn referenceable_identity_types(&self) -> impl Iterator<Item = &IdentityTypeId> {
        self.people_types
            .iter()
            .filter(|p| p.can_reference)
            .map(|p| &p.identity_type)
    }

    /// Identity types with create permission, in declaration order.
    pub fn creatable_identity_types(&self) -> impl Iterator<Item = &IdentityTypeId> {
        self.people_types
            .iter()
            .filter(|p| p.can_create)
            .map(|p| &p.identity_type)
    }

    fn permission(&self, identity_type: &IdentityTypeId) -> Option<&IdentityTypePermission> {
        self.people_types
            .iter()
            .find(|p| &p.identity_type == identity_type)
    }

    fn permission_mut(&mut self, identity_type: IdentityTypeId) -> &mut IdentityTypePermission {
        let index = self
            .people_types
            .iter()
            .position(|p| p.identity_type == identity_type);
        match index {
            Some(i) => &mut self.people_types[i],
            None => {
                self.people_types
                    .push(IdentityTypePermission::new(identity_type));
                self.people_types.last_mut().expect("just pushed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> IdentityTypeId {
        IdentityTypeId::new("contact", "person")
    }

    #[test]
    fn test_two_part_id() {
        let event_type = EventType::new("node", "conference");
        assert_eq!(event_type.id(), "node.conference");
    }

    #[test]
    fn test_permission_matrix_defaults_closed() {
        let event_type = EventType::new("node", "conference");
        assert!(!event_type.can_identity_type_create(&contact()));
        assert!(!event_type.can_identity_type_reference(&contact()));
        assert_eq!(event_type.identity_type_form_mode(&contact()), "default");
    }

    #[test]
    fn test_permission_entries_created_on_demand() {
        let mut event_type = EventType::new("node", "conference");
        event_type.set_identity_type_reference(contact(), true);
        event_type.set_identity_type_form_mode(contact(), "compact");

        assert!(event_type.can_identity_type_reference(&contact()));
        assert!(!event_type.can_identity_type_create(&contact()));
        assert_eq!(event_type.identity_type_form_mode(&contact()), "compact");
        assert_eq!(event_type.referenceable_identity_types().count(), 1);
        assert_eq!(event_type.creatable_identity_types().count(), 0);
    }
}
