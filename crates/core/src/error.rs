//! Error taxonomy shared by the speech collaborators, the webhook client and
//! the session loop.

use std::time::Duration;

/// Failures surfaced by the assistant's collaborators.
///
/// Only [`AssistantError::InputClosed`] is terminal for a session. Everything
/// else is contained by the layer that observes it.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// The listener waited for the whole window without hearing anything.
    /// This is the normal way out of the follow-up loop, not a fault.
    #[error("Listening timed out after {0:?}")]
    ListeningTimeout(Duration),
    #[error("Speech recognition failed: {0}")]
    Recognition(String),
    /// The audio source is gone for good (device removed, stdin closed).
    #[error("Speech input closed")]
    InputClosed,
    #[error("Webhook request failed: {0}")]
    Webhook(String),
    #[error("Webhook responded with status {0}")]
    WebhookStatus(u16),
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}

impl AssistantError {
    /// Returns `true` for the expected end of a follow-up window.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AssistantError::ListeningTimeout(_))
    }

    /// Returns `true` when the session cannot continue listening at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AssistantError::InputClosed)
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
