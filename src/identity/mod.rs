//! Identities: person/account records registrants can bind to.
//!
//! Identity records are owned outside this crate; the store keeps a
//! projection (bundle, lookup email, mirrorable fields) sufficient for
//! auto-attach and field sync.

pub mod selection;

use serde::{Deserialize, Serialize};

use crate::core::Fields;

pub use selection::{IdentitySelection, StoreSelection};

/// An identity type: an (entity type, bundle) pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityTypeId {
    /// The identity's entity type.
    pub entity_type: String,
    /// The identity's bundle within its entity type.
    pub bundle: String,
}

impl IdentityTypeId {
    /// Create a new identity type id.
    pub fn new(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
        }
    }
}

impl std::fmt::Display for IdentityTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.entity_type, self.bundle)
    }
}

/// Projection of an externally-owned identity record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// The identity's bundle.
    pub bundle: String,
    /// Address used for auto-attach lookups.
    pub email: Option<String>,
    /// Field data mirrorable with registrants.
    pub fields: Fields,
}

impl Identity {
    /// Create an identity in the given bundle.
    pub fn new(bundle: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            ..Self::default()
        }
    }

    /// Builder-style email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder-style field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.set(name, value);
        self
    }
}
