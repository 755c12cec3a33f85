//! In-memory dialogue transcript for a single activation.

use serde::Serialize;
use std::fmt;

/// Who produced a turn.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One utterance or reply, tagged with its speaker.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Speaker,
    pub content: String,
}

/// Ordered, append-only record of the turns since the last activation.
///
/// A fresh `Conversation` is created on every activation and dropped when the
/// session falls back to idle.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.push(Speaker::User, text.into());
    }

    pub fn add_assistant_response(&mut self, text: impl Into<String>) {
        self.push(Speaker::Assistant, text.into());
    }

    /// Renders the transcript as `role: content` lines in insertion order.
    /// An empty conversation renders as the empty string.
    pub fn get_conversation_history(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drops the most recent turn. Does nothing on an empty conversation.
    pub fn remove_last_message(&mut self) -> Option<ConversationTurn> {
        self.turns.pop()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, role: Speaker, content: String) {
        self.turns.push(ConversationTurn { role, content });
    }
}
