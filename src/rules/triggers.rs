//! Well-known trigger ids.
//!
//! Trigger ids are an open set; integrations may fire their own. These are
//! the ids the engine's defaults refer to.

/// Registration access evaluation for an event.
pub const EVENT_REGISTER: &str = "event.register";

/// A registration was created.
pub const REGISTRATION_NEW: &str = "registration.new";

/// A registration was updated.
pub const REGISTRATION_UPDATE: &str = "registration.update";

/// Recurring date-based message trigger; rules on it carry a
/// `rule_schedule` condition addressed by component id.
pub const DATE_CUSTOM: &str = "date.custom";
