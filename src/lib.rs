//! # regkit
//!
//! A general-purpose event registration engine. Any record can host
//! registrations: declare an [`EventType`] for its (entity type, bundle)
//! pair and the engine provides capacity accounting, registrant identity
//! handling, group constraints, and a trigger-driven rule engine around the
//! registration lifecycle.
//!
//! ## Design Principles
//!
//! 1. **Host-Agnostic**: Events and identities are opaque [`EntityRef`]s.
//!    The engine never interprets the records it decorates.
//!
//! 2. **Configuration Over Convention**: Event types declare policy
//!    (anonymous registrants, field sync, identity permissions); the engine
//!    hardcodes none of it.
//!
//! 3. **Collaborators At The Seams**: Persistence, message delivery,
//!    identity selection, and plugin behavior sit behind narrow contracts
//!    ([`RecordStore`], [`Dispatcher`], [`IdentitySelection`],
//!    [`PluginRegistry`]).
//!
//! ## Modules
//!
//! - `core`: ids, entity references, capacities, field data, site config
//! - `events`: event types, per-event settings, the meta facade, manager
//! - `registration`: registrations, registrant slots, pre-commit contract
//! - `groups`: group records with dependency/conflict constraints
//! - `rules`: rules, plugin registry, contexts, built-ins, site defaults
//! - `identity`: identity projections and the selection collaborator
//! - `store`: in-memory record store with joined queries
//! - `dispatch`: outbound message contract
//!
//! ## Concurrency
//!
//! Single-actor and synchronous by design. Capacity checks are
//! check-then-act; callers needing strict guarantees serialize externally
//! or retry on a store clone (clones are cheap - tables are persistent
//! maps).

pub mod core;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod groups;
pub mod identity;
pub mod registration;
pub mod rules;
pub mod store;

// Re-export commonly used types
pub use crate::core::{
    Capacity, ComponentId, EntityRef, Fields, GroupId, RegistrantId, RegistrationId, RuleId,
    SystemConfig,
};
pub use crate::dispatch::{DispatchError, Dispatcher, NullDispatcher, OutboundMessage};
pub use crate::error::{Error, GroupConstraintError};
pub use crate::events::{EventManager, EventMeta, EventSettings, EventType};
pub use crate::groups::{Group, GroupSource};
pub use crate::identity::{Identity, IdentitySelection, IdentityTypeId, StoreSelection};
pub use crate::registration::{Registrant, Registration};
pub use crate::rules::{
    Action, ActionError, ComponentKind, Condition, DefaultMessage, PluginConfig, PluginRegistry,
    Rule, RuleComponent, RuleContext, TriggerReport,
};
pub use crate::store::{EventRecord, RecordStore};
