//! Site-wide engine configuration.
//!
//! The engine never hardcodes which identity types exist - deployments
//! declare them here, and per-event-type permission matrices are intersected
//! against this list at query time. Matrix entries naming types that are no
//! longer declared are tolerated and silently filtered out.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityTypeId;

/// Global configuration shared by every event type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Identity types that exist and may be used for registration anywhere
    /// on the site. Event types narrow this list, never extend it.
    pub identity_types: Vec<IdentityTypeId>,
}

impl SystemConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration of an identity type.
    #[must_use]
    pub fn with_identity_type(mut self, entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        self.identity_types.push(IdentityTypeId::new(entity_type, bundle));
        self
    }

    /// Whether the given identity type is declared.
    #[must_use]
    pub fn has_identity_type(&self, identity_type: &IdentityTypeId) -> bool {
        self.identity_types.contains(identity_type)
    }
}
