//! Routes recognized commands to the webhook and guarantees a speakable reply.

use crate::phrases::FALLBACK_REPLY;
use crate::webhook::Webhook;
use tracing::{error, info, warn};

/// Forwards commands (or a rendered conversation) to a [`Webhook`].
///
/// `handle_interaction` never fails: an empty reply or any webhook error is
/// replaced by the fallback sentence so the session always has something to
/// say.
pub struct InteractionRouter {
    webhook: Box<dyn Webhook>,
    fallback: String,
}

impl InteractionRouter {
    pub fn new(webhook: Box<dyn Webhook>) -> Self {
        Self {
            webhook,
            fallback: FALLBACK_REPLY.to_string(),
        }
    }

    /// Overrides the sentence used when no usable reply arrives.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn handle_interaction(&self, request: &str) -> String {
        info!(request = %request, "Forwarding command to webhook");
        match self.webhook.send(request) {
            Ok(reply) if !reply.trim().is_empty() => {
                info!(reply = %reply, "Received webhook reply");
                reply
            }
            Ok(_) => {
                warn!("Webhook returned an empty reply");
                self.fallback.clone()
            }
            Err(e) => {
                error!(error = %e, "Webhook communication failed");
                self.fallback.clone()
            }
        }
    }
}
