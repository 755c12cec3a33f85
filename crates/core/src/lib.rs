//! Core of the Auxilia voice assistant: the conversation ledger, exit-command
//! detection, webhook routing and the session state machine.
//!
//! Speech engines and the webhook are reached through the traits in
//! [`speech`] and [`webhook`], so the state machine runs the same against
//! real audio, a console or test doubles.

pub mod classifier;
pub mod conversation;
pub mod error;
pub mod phrases;
pub mod router;
pub mod session;
pub mod speech;
pub mod webhook;

pub use error::{AssistantError, Result};
pub use session::{Session, SessionSettings, SessionState};
