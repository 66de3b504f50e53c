//! Rules and their components.
//!
//! A rule binds an ordered list of condition and action components to one
//! event and one trigger id. Components name their behavior by plugin id;
//! binding to an executable happens lazily at evaluation time through the
//! [`PluginRegistry`](crate::rules::PluginRegistry), so a rule referencing a
//! missing plugin loads fine and only fails when evaluated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::core::{ComponentId, EntityRef, RuleId};
use crate::error::Error;
use crate::rules::context::EvalContext;
use crate::rules::registry::PluginRegistry;

/// Plugin configuration attached to a component.
pub type PluginConfig = Map<String, Value>;

/// Whether a component gates (condition) or acts (action).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Evaluated before actions; all conditions must hold.
    Condition,
    /// Executed in definition order once conditions hold.
    Action,
}

/// One condition or action slot on a rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleComponent {
    /// Store-assigned id; `ComponentId::UNSAVED` until the rule is inserted.
    pub id: ComponentId,
    /// Condition or action.
    pub kind: ComponentKind,
    /// Registry key of the behavior to run.
    pub plugin_id: String,
    /// Free-form configuration passed to the plugin.
    pub configuration: PluginConfig,
}

impl RuleComponent {
    /// Create a condition component.
    pub fn condition(plugin_id: impl Into<String>) -> Self {
        Self {
            id: ComponentId::UNSAVED,
            kind: ComponentKind::Condition,
            plugin_id: plugin_id.into(),
            configuration: PluginConfig::new(),
        }
    }

    /// Create an action component.
    pub fn action(plugin_id: impl Into<String>) -> Self {
        Self {
            id: ComponentId::UNSAVED,
            kind: ComponentKind::Action,
            plugin_id: plugin_id.into(),
            configuration: PluginConfig::new(),
        }
    }

    /// Set one configuration key (builder pattern).
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.configuration.insert(key.into(), value);
        self
    }
}

/// A named bundle of conditions and actions scoped to one event and trigger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Store-assigned id; `RuleId::UNSAVED` until inserted.
    pub id: RuleId,
    /// The event this rule belongs to.
    pub event: EntityRef,
    /// The lifecycle point this rule listens on.
    pub trigger_id: String,
    /// Inactive rules are skipped by trigger passes.
    pub active: bool,
    /// Components in definition order.
    pub components: SmallVec<[RuleComponent; 4]>,
}

impl Rule {
    /// Create an unsaved, active rule.
    pub fn new(event: EntityRef, trigger_id: impl Into<String>) -> Self {
        Self {
            id: RuleId::UNSAVED,
            event,
            trigger_id: trigger_id.into(),
            active: true,
            components: SmallVec::new(),
        }
    }

    /// Set the active flag (builder pattern).
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Append a component (builder pattern).
    #[must_use]
    pub fn with_component(mut self, component: RuleComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Whether this rule has been persisted.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_saved()
    }

    /// Condition components in definition order.
    pub fn conditions(&self) -> impl Iterator<Item = &RuleComponent> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Condition)
    }

    /// Action components in definition order.
    pub fn actions(&self) -> impl Iterator<Item = &RuleComponent> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Action)
    }

    /// Find a component by id.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&RuleComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Logical AND over all condition components, short-circuiting on the
    /// first unsatisfied one. A rule with zero conditions is always true.
    ///
    /// Fails with [`Error::PluginNotFound`] when a condition names an
    /// unregistered plugin.
    pub fn evaluate_conditions(
        &self,
        plugins: &PluginRegistry,
        eval: &EvalContext<'_>,
    ) -> Result<bool, Error> {
        for component in self.conditions() {
            let plugin = plugins.resolve_condition(&component.plugin_id)?;
            if !plugin.is_satisfied(&component.configuration, eval) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> EntityRef {
        EntityRef::new("node", 1)
    }

    #[test]
    fn test_component_order_preserved() {
        let rule = Rule::new(event(), "registration.new")
            .with_component(RuleComponent::action("first"))
            .with_component(RuleComponent::condition("gate"))
            .with_component(RuleComponent::action("second"));

        let actions: Vec<&str> = rule.actions().map(|c| c.plugin_id.as_str()).collect();
        assert_eq!(actions, ["first", "second"]);
        assert_eq!(rule.conditions().count(), 1);
    }

    #[test]
    fn test_serialization_round_trip() {
        let rule = Rule::new(event(), "registration.new").with_component(
            RuleComponent::condition("user_role").with_config("roles", json!(["editor"])),
        );

        let encoded = serde_json::to_string(&rule).unwrap();
        let decoded: Rule = serde_json::from_str(&encoded).unwrap();
        assert_eq!(rule, decoded);
    }
}
