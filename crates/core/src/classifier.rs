//! Exit-command detection.

/// Exit phrases that are always recognized, in addition to `"<name> aus"`.
pub const DEFAULT_EXIT_PHRASES: &[&str] = &[
    "beenden",
    "exit",
    "tschüss",
    "assistent aus",
    "stop",
    "schließen",
];

/// Decides whether a recognized utterance asks the assistant to shut down.
///
/// Matching is a case-insensitive substring test, so `"stoppuhr"` counts as
/// `"stop"`. Recognition noise around the phrase is tolerated in exchange.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    phrases: Vec<String>,
}

impl CommandClassifier {
    /// Builds the default phrase set for an assistant called `assistant_name`.
    pub fn new(assistant_name: &str) -> Self {
        Self::with_extra_phrases(assistant_name, std::iter::empty::<String>())
    }

    /// Like [`CommandClassifier::new`], plus caller supplied phrases.
    /// Blank phrases are ignored since they would match every utterance.
    pub fn with_extra_phrases<I, S>(assistant_name: &str, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = assistant_name.trim();
        let named = (!name.is_empty()).then(|| format!("{} aus", name));
        let phrases = DEFAULT_EXIT_PHRASES
            .iter()
            .map(|p| p.to_string())
            .chain(named)
            .chain(extra.into_iter().map(|p| p.as_ref().to_string()))
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn is_exit_command(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.phrases.iter().any(|phrase| text.contains(phrase.as_str()))
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}
