//! Core building blocks: ids, references, capacities, field data, config.

pub mod capacity;
pub mod config;
pub mod entity;
pub mod fields;

pub use capacity::Capacity;
pub use config::SystemConfig;
pub use entity::{ComponentId, EntityRef, GroupId, RegistrantId, RegistrationId, RuleId};
pub use fields::{two_way_fill, Fields, FillOutcome};
