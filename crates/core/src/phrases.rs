//! Fixed sentences the assistant speaks.

/// Spoken when the session is shut down by an exit command.
pub const FAREWELL: &str = "Tschüss, bis bald!";

/// Spoken after a failed listening or speaking step.
pub const APOLOGY: &str =
    "Entschuldigung, ich habe das nicht verstanden. Kannst du das bitte wiederholen?";

/// Substituted for a missing or failed webhook reply.
pub const FALLBACK_REPLY: &str =
    "Entschuldigung, ich habe keine Antwort erhalten. Bitte versuche es später erneut.";

/// Introduction spoken once at startup.
pub fn greeting(assistant_name: &str, activation_phrase: &str) -> String {
    format!(
        "Hi, ich bin {}. Ich bin dein persönlicher Assistent. \
         Sag einfach {} und stelle mir eine Frage.",
        assistant_name, activation_phrase
    )
}
