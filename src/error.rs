//! Error taxonomy.
//!
//! Every violation is raised synchronously at the point it is detected and
//! aborts the current mutating operation. Nothing is retried by the engine.
//! Action failures inside a trigger pass are the one deliberate exception:
//! they are logged and isolated per action, never surfaced as an `Error`.

use thiserror::Error;

use crate::core::{GroupId, RegistrationId};

/// Errors raised by the registration engine.
#[derive(Error, Debug)]
pub enum Error {
    /// The entity's bundle is not configured as an event.
    #[error("{entity_type}: {bundle} is not an event bundle")]
    InvalidEvent {
        entity_type: String,
        bundle: String,
    },

    /// A registrant write violated the registrant contract.
    #[error("invalid registrant: {0}")]
    InvalidRegistrant(String),

    /// A registrant would exceed its registration's quantity cap.
    #[error("{registration} already holds its maximum of {quantity} registrants")]
    MaxRegistrantsExceeded {
        registration: RegistrationId,
        quantity: u32,
    },

    /// A rule component named a plugin the registry does not know.
    #[error("no plugin registered for id '{plugin_id}'")]
    PluginNotFound { plugin_id: String },

    /// A group mutation violated a dependency or conflict constraint.
    #[error(transparent)]
    GroupConstraint(#[from] GroupConstraintError),

    /// A write referenced a record the store does not hold.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// Dependency/conflict violations on group attach and detach.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GroupConstraintError {
    /// The group requires another group that is not on the registration.
    #[error("group {group} requires group {requires}, which is not present")]
    MissingDependency { group: GroupId, requires: GroupId },

    /// The group conflicts with a group already on the registration.
    #[error("group {group} conflicts with group {conflicts_with}, which is present")]
    Conflicting {
        group: GroupId,
        conflicts_with: GroupId,
    },

    /// A remaining group depends on the group being removed.
    #[error("group {group} cannot be removed while group {dependent} depends on it")]
    HasDependents { group: GroupId, dependent: GroupId },

    /// The group is not attached to the registration.
    #[error("group {group} is not attached to the registration")]
    NotAttached { group: GroupId },
}
