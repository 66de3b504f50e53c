//! Plugin registry: string id to executable behavior.
//!
//! Conditions and actions are registered under string ids and resolved
//! lazily when a rule is evaluated. Resolution failure is a typed error,
//! not a missing-key panic, and aborts only the rule being evaluated.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::error::Error;
use crate::rules::context::{ActionContext, EvalContext};
use crate::rules::rule::PluginConfig;

/// A condition plugin: pure predicate over the evaluation context.
pub trait Condition {
    /// Whether the condition holds for this configuration and context.
    fn is_satisfied(&self, config: &PluginConfig, eval: &EvalContext<'_>) -> bool;
}

/// Failure reported by an action plugin.
///
/// The engine logs these and continues with the next action; they never
/// roll back the write that fired the trigger.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ActionError(pub String);

/// An action plugin: side-effecting behavior run through collaborators.
pub trait Action {
    /// Execute the action. Return values beyond failure are ignored.
    fn execute(&self, config: &PluginConfig, ctx: &mut ActionContext<'_>) -> Result<(), ActionError>;
}

/// Registry of condition and action plugins keyed by string id.
#[derive(Default)]
pub struct PluginRegistry {
    conditions: FxHashMap<String, Box<dyn Condition>>,
    actions: FxHashMap<String, Box<dyn Action>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in plugins registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::builtin::register(&mut registry);
        registry
    }

    /// Register a condition plugin. Replaces any previous plugin under the
    /// same id.
    pub fn register_condition(&mut self, id: impl Into<String>, plugin: Box<dyn Condition>) {
        self.conditions.insert(id.into(), plugin);
    }

    /// Register an action plugin. Replaces any previous plugin under the
    /// same id.
    pub fn register_action(&mut self, id: impl Into<String>, plugin: Box<dyn Action>) {
        self.actions.insert(id.into(), plugin);
    }

    /// Resolve a condition plugin by id.
    pub fn resolve_condition(&self, id: &str) -> Result<&dyn Condition, Error> {
        self.conditions
            .get(id)
            .map(Box::as_ref)
            .ok_or_else(|| Error::PluginNotFound {
                plugin_id: id.to_string(),
            })
    }

    /// Resolve an action plugin by id.
    pub fn resolve_action(&self, id: &str) -> Result<&dyn Action, Error> {
        self.actions
            .get(id)
            .map(Box::as_ref)
            .ok_or_else(|| Error::PluginNotFound {
                plugin_id: id.to_string(),
            })
    }

    /// Whether a condition plugin is registered under `id`.
    #[must_use]
    pub fn has_condition(&self, id: &str) -> bool {
        self.conditions.contains_key(id)
    }

    /// Whether an action plugin is registered under `id`.
    #[must_use]
    pub fn has_action(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }
}
