//! Capability interfaces for the speech engines.
//!
//! The session loop only ever talks to these traits, so a microphone backed
//! recognizer, a console stand-in or a test double can be swapped in freely.

use crate::error::{AssistantError, Result};
use std::time::Duration;

/// Parameters for a single listening call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListeningRequest {
    /// How long to wait for speech to start. `None` blocks indefinitely.
    pub timeout: Option<Duration>,
    /// Upper bound on the length of a single captured phrase.
    pub phrase_time_limit: Duration,
}

impl ListeningRequest {
    /// A request that waits forever for speech.
    pub fn unbounded(phrase_time_limit: Duration) -> Self {
        Self {
            timeout: None,
            phrase_time_limit,
        }
    }

    /// A request that gives up with [`AssistantError::ListeningTimeout`]
    /// after `timeout`.
    pub fn bounded(timeout: Duration, phrase_time_limit: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            phrase_time_limit,
        }
    }
}

/// Strips everything but alphanumerics and lower-cases the rest.
///
/// `"Hallo, Assistant!"` becomes `"halloassistant"`.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A speech-to-text engine.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechToText {
    /// Listens once and returns the recognized text.
    ///
    /// An empty string means nothing usable was recognized. Expiry of
    /// `request.timeout` is reported as [`AssistantError::ListeningTimeout`].
    fn listen(&self, request: &ListeningRequest) -> Result<String>;

    /// Keeps listening until the recognized text contains `phrase`, compared
    /// after [`normalize_text`], and returns the full utterance.
    fn listen_to_phrase(&self, phrase: &str, request: &ListeningRequest) -> Result<String> {
        let target = normalize_text(phrase);
        if target.is_empty() {
            return Err(AssistantError::Recognition(
                "Activation phrase must contain at least one letter or digit".to_string(),
            ));
        }
        loop {
            let heard = self.listen(request)?;
            if normalize_text(&heard).contains(&target) {
                return Ok(heard);
            }
            tracing::debug!(utterance = %heard, "Ignoring speech without activation phrase");
        }
    }
}

/// A text-to-speech engine. `speak` blocks until playback has finished.
#[cfg_attr(test, mockall::automock)]
pub trait TextToSpeech {
    fn speak(&self, text: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays a fixed script so the provided `listen_to_phrase` is exercised.
    struct Scripted {
        utterances: RefCell<VecDeque<Result<String>>>,
    }

    impl Scripted {
        fn new(items: Vec<Result<String>>) -> Self {
            Self {
                utterances: RefCell::new(items.into()),
            }
        }
    }

    impl SpeechToText for Scripted {
        fn listen(&self, _request: &ListeningRequest) -> Result<String> {
            self.utterances
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(AssistantError::InputClosed))
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Hallo, Assistant!"), "halloassistant");
        assert_eq!(normalize_text("  TSCHÜSS  "), "tschüss");
        assert_eq!(normalize_text("?!"), "");
    }

    #[test]
    fn test_listening_request_constructors() {
        let unbounded = ListeningRequest::unbounded(Duration::from_secs(4));
        assert_eq!(unbounded.timeout, None);
        assert_eq!(unbounded.phrase_time_limit, Duration::from_secs(4));

        let bounded = ListeningRequest::bounded(Duration::from_secs(5), Duration::from_secs(2));
        assert_eq!(bounded.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_listen_to_phrase_skips_unrelated_speech() {
        let stt = Scripted::new(vec![
            Ok("".to_string()),
            Ok("guten morgen".to_string()),
            Ok("hallo assistant, wie ist das wetter".to_string()),
        ]);
        let request = ListeningRequest::unbounded(Duration::from_secs(4));

        let heard = stt.listen_to_phrase("Hallo Assistant", &request).unwrap();
        assert_eq!(heard, "hallo assistant, wie ist das wetter");
    }

    #[test]
    fn test_listen_to_phrase_ignores_punctuation_and_case() {
        let stt = Scripted::new(vec![Ok("HALLO-Assistant!".to_string())]);
        let request = ListeningRequest::unbounded(Duration::from_secs(4));

        assert!(stt.listen_to_phrase("hallo assistant", &request).is_ok());
    }

    #[test]
    fn test_listen_to_phrase_propagates_listener_errors() {
        let stt = Scripted::new(vec![Ok("nichts".to_string())]);
        let request = ListeningRequest::unbounded(Duration::from_secs(4));

        let err = stt.listen_to_phrase("hallo assistant", &request).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_listen_to_phrase_rejects_empty_target() {
        let stt = Scripted::new(vec![]);
        let request = ListeningRequest::unbounded(Duration::from_secs(4));

        let err = stt.listen_to_phrase("  !! ", &request).unwrap_err();
        assert!(matches!(err, AssistantError::Recognition(_)));
    }
}
