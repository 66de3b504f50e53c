//! The rule engine: rules, components, plugins, contexts, defaults.

pub mod builtin;
pub mod context;
pub mod defaults;
pub mod registry;
pub mod rule;
pub mod triggers;

pub use context::{ActionContext, EvalContext, RuleContext, TriggerReport};
pub use defaults::{default_access_rules, default_rules, message_rule, DefaultMessage};
pub use registry::{Action, ActionError, Condition, PluginRegistry};
pub use rule::{ComponentKind, PluginConfig, Rule, RuleComponent};
