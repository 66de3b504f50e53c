//! Notification dispatch collaborator.
//!
//! Message delivery lives outside this crate. Action plugins hand fully
//! addressed [`OutboundMessage`]s to a [`Dispatcher`]; queueing, templating,
//! retries, and duplicate suppression are the implementation's business.

use thiserror::Error;

use crate::core::{EntityRef, RegistrantId, RegistrationId};

/// Delivery failure reported by a dispatcher.
#[derive(Error, Debug)]
#[error("dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// A message addressed to one registrant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Template the dispatcher renders.
    pub template: String,
    /// The registrant being messaged.
    pub registrant: RegistrantId,
    /// The registrant's registration.
    pub registration: RegistrationId,
    /// The event the registration belongs to.
    pub event: EntityRef,
}

/// Sends messages on behalf of action plugins.
pub trait Dispatcher {
    /// Deliver one message. Failures are logged by the engine and isolated
    /// to the action that sent them.
    fn send(&mut self, message: &OutboundMessage) -> Result<(), DispatchError>;
}

/// A dispatcher that drops every message.
///
/// For callers that run trigger passes without a delivery backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDispatcher;

impl Dispatcher for NullDispatcher {
    fn send(&mut self, _message: &OutboundMessage) -> Result<(), DispatchError> {
        Ok(())
    }
}
