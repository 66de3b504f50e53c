//! Registration records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityRef, GroupId, RegistrationId};

/// One submission against an event.
///
/// A registration owns registrant slots (stored separately, referencing the
/// registration) and carries group membership. `registrant_qty` caps how
/// many slots the registration may hold; `0` means unlimited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Store-assigned id; `RegistrationId::UNSAVED` until inserted.
    pub id: RegistrationId,
    /// The event registered against.
    pub event: EntityRef,
    /// The identity that owns this registration, if any.
    pub owner: Option<EntityRef>,
    /// Whether the registration has been confirmed.
    pub confirmed: bool,
    /// Maximum registrant slots, `0` for unlimited.
    pub registrant_qty: u32,
    /// Groups attached to this registration.
    pub groups: SmallVec<[GroupId; 4]>,
    /// When the registration was created.
    pub created: DateTime<Utc>,
}

impl Registration {
    /// Create an unsaved registration against an event.
    ///
    /// `created` is supplied by the caller; the engine never reads the wall
    /// clock itself.
    pub fn new(event: EntityRef, created: DateTime<Utc>) -> Self {
        Self {
            id: RegistrationId::UNSAVED,
            event,
            owner: None,
            confirmed: false,
            registrant_qty: 0,
            groups: SmallVec::new(),
            created,
        }
    }

    /// Set the owner (builder pattern).
    #[must_use]
    pub fn with_owner(mut self, owner: EntityRef) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the confirmed flag (builder pattern).
    #[must_use]
    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Set the registrant cap (builder pattern). `0` means unlimited.
    #[must_use]
    pub fn with_registrant_qty(mut self, qty: u32) -> Self {
        self.registrant_qty = qty;
        self
    }

    /// Whether another registrant fits under the quantity cap, given the
    /// current slot count.
    #[must_use]
    pub fn can_add_registrants(&self, current: u32, count: u32) -> bool {
        self.registrant_qty == 0 || current.saturating_add(count) <= self.registrant_qty
    }

    /// Whether the given group is attached.
    #[must_use]
    pub fn has_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(qty: u32) -> Registration {
        Registration::new(EntityRef::new("node", 1), DateTime::UNIX_EPOCH)
            .with_registrant_qty(qty)
    }

    #[test]
    fn test_zero_qty_is_unlimited() {
        assert!(registration(0).can_add_registrants(10_000, 1));
    }

    #[test]
    fn test_qty_cap() {
        let r = registration(2);
        assert!(r.can_add_registrants(0, 1));
        assert!(r.can_add_registrants(1, 1));
        assert!(!r.can_add_registrants(2, 1));
        assert!(!r.can_add_registrants(1, 2));
    }
}
