//! Built-in condition and action plugins.
//!
//! The engine ships the plugins its default rules and message rules refer
//! to. Deployments extend the set by registering their own ids; nothing
//! here is special-cased by the evaluator.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::dispatch::OutboundMessage;
use crate::rules::context::{ActionContext, EvalContext};
use crate::rules::registry::{Action, ActionError, Condition, PluginRegistry};
use crate::rules::rule::PluginConfig;

/// Condition: acting user holds one of the configured roles.
pub const USER_ROLE: &str = "user_role";
/// Condition: the context identity is a registrant of the context
/// registration.
pub const REGISTRATION_IDENTITY: &str = "registration_identity";
/// Condition: acting user holds the configured event operations.
pub const EVENT_OPERATION: &str = "event_operation";
/// Condition: the context clock has passed the configured date.
pub const RULE_SCHEDULE: &str = "rule_schedule";
/// Action: grant registration operations to the acting user.
pub const REGISTRATION_OPERATIONS: &str = "registration_operations";
/// Action: send a templated message to the registration's registrants.
pub const SEND_MESSAGE: &str = "send_message";

/// Register every built-in plugin.
pub fn register(registry: &mut PluginRegistry) {
    registry.register_condition(USER_ROLE, Box::new(UserRole));
    registry.register_condition(REGISTRATION_IDENTITY, Box::new(RegistrationIdentity));
    registry.register_condition(EVENT_OPERATION, Box::new(EventOperation));
    registry.register_condition(RULE_SCHEDULE, Box::new(RuleSchedule));
    registry.register_action(REGISTRATION_OPERATIONS, Box::new(RegistrationOperations));
    registry.register_action(SEND_MESSAGE, Box::new(SendMessage));
}

fn string_list(config: &PluginConfig, key: &str) -> Vec<String> {
    config
        .get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn enabled_operations(config: &PluginConfig) -> Vec<String> {
    config
        .get("operations")
        .and_then(Value::as_object)
        .map(|ops| {
            ops.iter()
                .filter(|(_, enabled)| enabled.as_bool() == Some(true))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// `user_role`: configuration key `roles` lists role names. An empty list
/// matches any actor; otherwise any overlap with the actor's roles
/// satisfies the condition.
struct UserRole;

impl Condition for UserRole {
    fn is_satisfied(&self, config: &PluginConfig, eval: &EvalContext<'_>) -> bool {
        let roles = string_list(config, "roles");
        roles.is_empty() || roles.iter().any(|role| eval.ctx.actor_roles.contains(role))
    }
}

/// `registration_identity`: the context identity occupies a registrant slot
/// on the context registration.
struct RegistrationIdentity;

impl Condition for RegistrationIdentity {
    fn is_satisfied(&self, _config: &PluginConfig, eval: &EvalContext<'_>) -> bool {
        let (Some(identity), Some(registration)) =
            (&eval.ctx.identity, eval.ctx.registration)
        else {
            return false;
        };
        eval.store
            .registrants_for_registration(registration)
            .iter()
            .any(|registrant| registrant.has_identity(identity))
    }
}

/// `event_operation`: configuration key `operations` maps operation names to
/// booleans; every enabled operation must be held by the actor.
struct EventOperation;

impl Condition for EventOperation {
    fn is_satisfied(&self, config: &PluginConfig, eval: &EvalContext<'_>) -> bool {
        enabled_operations(config)
            .iter()
            .all(|op| eval.ctx.actor_event_operations.contains(op))
    }
}

/// `rule_schedule`: configuration key `date` holds an RFC 3339 date the
/// context clock must have reached. The `component` key carries the
/// component's own id, written during message-rule setup so external
/// schedulers can address the entry; evaluation ignores it. A missing or
/// unparsable date never fires.
struct RuleSchedule;

impl Condition for RuleSchedule {
    fn is_satisfied(&self, config: &PluginConfig, eval: &EvalContext<'_>) -> bool {
        let Some(date) = config
            .get("date")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
        else {
            return false;
        };
        eval.ctx.now >= date
    }
}

/// `registration_operations`: configuration key `operations` maps operation
/// names to booleans; enabled ones accumulate in the pass grant set.
struct RegistrationOperations;

impl Action for RegistrationOperations {
    fn execute(&self, config: &PluginConfig, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        for operation in enabled_operations(config) {
            ctx.grants.insert(operation);
        }
        Ok(())
    }
}

/// `send_message`: configuration key `template` names the message template;
/// one message per registrant of the context registration goes through the
/// dispatcher. Without a registration in context there is nobody to
/// address, which is not a failure.
struct SendMessage;

impl Action for SendMessage {
    fn execute(&self, config: &PluginConfig, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let template = config
            .get("template")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError("send_message requires a 'template' key".into()))?;

        let Some(registration) = ctx.ctx.registration else {
            debug!(template, "send_message skipped: no registration in context");
            return Ok(());
        };

        for registrant in ctx.store.registrants_for_registration(registration) {
            let message = OutboundMessage {
                template: template.to_string(),
                registrant: registrant.id,
                registration,
                event: ctx.ctx.event.clone(),
            };
            ctx.dispatcher
                .send(&message)
                .map_err(|e| ActionError(e.to_string()))?;
        }
        Ok(())
    }
}
