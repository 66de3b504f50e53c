//! Per-event registration settings.
//!
//! These are the registration-facing fields an event record carries. The
//! engine reads them through the store; it never mutates them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Capacity, GroupId};

/// Registration settings attached to one event record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    /// Whether the event currently accepts new registrations.
    pub accepting_registrations: bool,
    /// Whether one identity may appear on multiple registrants.
    pub allow_duplicate_registrants: bool,
    /// Ceiling on registrations for the event.
    pub registration_capacity: Capacity,
    /// Ceiling on registrant slots across all registrations.
    pub registrant_capacity: Capacity,
    /// Count only registrants of confirmed registrations against the
    /// registrant capacity.
    pub capacity_confirmed_only: bool,
    /// Whether registrations past capacity may wait-list.
    pub allow_wait_list: bool,
    /// Reply-to address for messages sent from this event.
    pub reply_to: Option<String>,
    /// Groups attached to every new registration.
    pub default_groups: SmallVec<[GroupId; 4]>,
}

impl EventSettings {
    /// Settings for an open event with no ceilings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accepting flag (builder pattern).
    #[must_use]
    pub fn with_accepting(mut self, accepting: bool) -> Self {
        self.accepting_registrations = accepting;
        self
    }

    /// Set the registration ceiling (builder pattern).
    #[must_use]
    pub fn with_registration_capacity(mut self, capacity: Capacity) -> Self {
        self.registration_capacity = capacity;
        self
    }

    /// Set the registrant ceiling (builder pattern).
    #[must_use]
    pub fn with_registrant_capacity(mut self, capacity: Capacity) -> Self {
        self.registrant_capacity = capacity;
        self
    }

    /// Set the duplicate registrant policy (builder pattern).
    #[must_use]
    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicate_registrants = allow;
        self
    }

    /// Add a default group (builder pattern).
    #[must_use]
    pub fn with_default_group(mut self, group: GroupId) -> Self {
        self.default_groups.push(group);
        self
    }
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            accepting_registrations: true,
            allow_duplicate_registrants: false,
            registration_capacity: Capacity::Unlimited,
            registrant_capacity: Capacity::Unlimited,
            capacity_confirmed_only: false,
            allow_wait_list: false,
            reply_to: None,
            default_groups: SmallVec::new(),
        }
    }
}
