//! The interaction state machine.
//!
//! ```text
//! Idle ──wake phrase──▶ Activated ──command──▶ Conversing ◀─┐
//!  ▲                        │                    │  │        │ follow-up
//!  └────── timeout ─────────┼────────────────────┘  └────────┘
//!                           └── exit ──▶ Terminated ◀── exit / input closed
//! ```
//!
//! Every listening, routing and speaking step is contained: a failure is
//! logged, an apology is spoken and the loop carries on. Only an exit command
//! or a closed speech source ends the session.

use crate::classifier::CommandClassifier;
use crate::conversation::Conversation;
use crate::error::Result;
use crate::phrases;
use crate::router::InteractionRouter;
use crate::speech::{ListeningRequest, SpeechToText, TextToSpeech};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Inputs that shape a session's behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub activation_phrase: String,
    pub assistant_name: String,
    /// How long to keep listening for a follow-up after each reply.
    pub follow_up_timeout: Duration,
    pub activation_phrase_limit: Duration,
    pub follow_up_phrase_limit: Duration,
    /// Exit phrases on top of the built-in ones.
    pub extra_exit_phrases: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            activation_phrase: "Hallo Assistant".to_string(),
            assistant_name: "Auxilia".to_string(),
            follow_up_timeout: Duration::from_secs(5),
            activation_phrase_limit: Duration::from_secs(4),
            follow_up_phrase_limit: Duration::from_secs(2),
            extra_exit_phrases: Vec::new(),
        }
    }
}

impl SessionSettings {
    /// The wake-phrase listener blocks until something is said.
    pub fn activation_request(&self) -> ListeningRequest {
        ListeningRequest::unbounded(self.activation_phrase_limit)
    }

    pub fn follow_up_request(&self) -> ListeningRequest {
        ListeningRequest::bounded(self.follow_up_timeout, self.follow_up_phrase_limit)
    }
}

/// Where the session currently is. Each state owns the data it needs.
#[derive(Debug, Default)]
pub enum SessionState {
    /// Waiting for the wake phrase.
    #[default]
    Idle,
    /// The wake phrase was heard. Holds the full utterance.
    Activated { utterance: String },
    /// Inside the follow-up window.
    Conversing { conversation: Conversation },
    /// Absorbing. The session loop has ended.
    Terminated,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Activated { .. } => "activated",
            SessionState::Conversing { .. } => "conversing",
            SessionState::Terminated => "terminated",
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// The live conversation, if the session is inside a follow-up window.
    pub fn conversation(&self) -> Option<&Conversation> {
        match self {
            SessionState::Conversing { conversation } => Some(conversation),
            _ => None,
        }
    }
}

/// A single-user voice session driving the speech engines and the router.
pub struct Session {
    settings: SessionSettings,
    classifier: CommandClassifier,
    router: InteractionRouter,
    activation_stt: Box<dyn SpeechToText>,
    command_stt: Box<dyn SpeechToText>,
    tts: Box<dyn TextToSpeech>,
    state: SessionState,
}

impl Session {
    /// Creates an idle session.
    ///
    /// The wake phrase and follow-up commands may come from different
    /// recognizers, e.g. a small local model for the wake phrase and a more
    /// accurate one for commands.
    pub fn new(
        settings: SessionSettings,
        router: InteractionRouter,
        activation_stt: Box<dyn SpeechToText>,
        command_stt: Box<dyn SpeechToText>,
        tts: Box<dyn TextToSpeech>,
    ) -> Self {
        let classifier = CommandClassifier::with_extra_phrases(
            &settings.assistant_name,
            &settings.extra_exit_phrases,
        );
        Self {
            settings,
            classifier,
            router,
            activation_stt,
            command_stt,
            tts,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Greets the user and drives the state machine until it terminates.
    pub fn run(&mut self) {
        let greeting = phrases::greeting(
            &self.settings.assistant_name,
            &self.settings.activation_phrase,
        );
        self.speak_or_log(&greeting);

        while !self.state.is_terminated() {
            self.step();
        }
        info!("Assistant session finished.");
    }

    /// Performs exactly one transition and returns the new state.
    pub fn step(&mut self) -> &SessionState {
        let current = std::mem::take(&mut self.state);
        let from = current.name();

        self.state = match current {
            SessionState::Idle => self.on_idle(),
            SessionState::Activated { utterance } => self.on_activated(utterance),
            SessionState::Conversing { conversation } => self.on_conversing(conversation),
            SessionState::Terminated => SessionState::Terminated,
        };

        if from != self.state.name() {
            info!(from, to = self.state.name(), "Session state changed");
        }
        &self.state
    }

    fn on_idle(&self) -> SessionState {
        info!("Listening for activation phrase...");
        let request = self.settings.activation_request();
        match self
            .activation_stt
            .listen_to_phrase(&self.settings.activation_phrase, &request)
        {
            Ok(utterance) if !utterance.trim().is_empty() => {
                info!(utterance = %utterance, "Activation phrase detected");
                SessionState::Activated { utterance }
            }
            Ok(_) => SessionState::Idle,
            Err(e) if e.is_fatal() => {
                warn!(error = %e, "Speech input is gone. Shutting down.");
                SessionState::Terminated
            }
            Err(e) if e.is_timeout() => {
                debug!("Activation listener timed out");
                SessionState::Idle
            }
            Err(e) => {
                error!(error = %e, "Error while listening for activation phrase");
                self.apologize();
                SessionState::Idle
            }
        }
    }

    fn on_activated(&self, utterance: String) -> SessionState {
        if self.classifier.is_exit_command(&utterance) {
            info!("Exit command detected. Shutting down assistant.");
            return self.farewell();
        }

        let mut conversation = Conversation::new();
        if let Err(e) = self.respond(&mut conversation, &utterance, false) {
            error!(error = %e, "Error processing initial input");
            self.apologize();
        }

        info!("Listening for follow-up input...");
        SessionState::Conversing { conversation }
    }

    fn on_conversing(&self, mut conversation: Conversation) -> SessionState {
        let request = self.settings.follow_up_request();
        let utterance = match self.command_stt.listen(&request) {
            Ok(text) if text.trim().is_empty() => {
                return SessionState::Conversing { conversation };
            }
            Ok(text) => text,
            Err(e) if e.is_timeout() => {
                info!("No follow-up input detected, waiting for activation phrase again.");
                return SessionState::Idle;
            }
            Err(e) if e.is_fatal() => {
                warn!(error = %e, "Speech input is gone. Shutting down.");
                return SessionState::Terminated;
            }
            Err(e) => {
                error!(error = %e, "Error while listening for follow-up input");
                self.apologize();
                return SessionState::Conversing { conversation };
            }
        };
        info!(utterance = %utterance, "Follow-up input received");

        if self.classifier.is_exit_command(&utterance) {
            info!("Exit command detected during follow-up. Shutting down assistant.");
            return self.farewell();
        }

        if let Err(e) = self.respond(&mut conversation, &utterance, true) {
            error!(error = %e, "Error processing follow-up input");
            self.apologize();
        }
        SessionState::Conversing { conversation }
    }

    /// Records `utterance`, routes it and speaks the reply.
    ///
    /// With `with_history` the whole rendered conversation is routed instead
    /// of the bare utterance. If the reply cannot be spoken the user turn is
    /// rolled back so the transcript never holds an unanswered command.
    fn respond(
        &self,
        conversation: &mut Conversation,
        utterance: &str,
        with_history: bool,
    ) -> Result<()> {
        conversation.add_user_message(utterance);
        let request = if with_history {
            conversation.get_conversation_history()
        } else {
            utterance.to_string()
        };

        let reply = self.router.handle_interaction(&request);
        if let Err(e) = self.tts.speak(&reply) {
            conversation.remove_last_message();
            return Err(e);
        }
        conversation.add_assistant_response(reply);
        Ok(())
    }

    fn farewell(&self) -> SessionState {
        self.speak_or_log(phrases::FAREWELL);
        SessionState::Terminated
    }

    fn apologize(&self) {
        self.speak_or_log(phrases::APOLOGY);
    }

    fn speak_or_log(&self, text: &str) {
        if let Err(e) = self.tts.speak(text) {
            error!(error = %e, text, "Failed to speak");
        }
    }
}
