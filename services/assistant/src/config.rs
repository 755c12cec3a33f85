use auxilia_core::SessionSettings;
use auxilia_core::webhook::{DEFAULT_WEBHOOK_TIMEOUT, WebhookMethod};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub webhook_url: String,
    pub webhook_method: WebhookMethod,
    pub webhook_timeout: Duration,
    pub activation_phrase: String,
    pub assistant_name: String,
    pub follow_up_timeout: Duration,
    pub extra_exit_phrases: Vec<String>,
    pub log_level: Level,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Loads `.env.<app_env>` and then `.env` before reading the environment.
    /// Variables already set in the process win over both files.
    pub fn load(app_env: &str) -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::from_filename(format!(".env.{}", app_env)).ok();
        }
        Self::from_env()
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let webhook_url = std::env::var("WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("WEBHOOK_URL".to_string()))?;
        Url::parse(&webhook_url)
            .map_err(|e| ConfigError::InvalidValue("WEBHOOK_URL".to_string(), e.to_string()))?;

        let webhook_method = match std::env::var("WEBHOOK_METHOD") {
            Ok(method) => method
                .parse::<WebhookMethod>()
                .map_err(|e| ConfigError::InvalidValue("WEBHOOK_METHOD".to_string(), e))?,
            Err(_) => WebhookMethod::default(),
        };

        let webhook_timeout = secs_var("WEBHOOK_TIMEOUT_SECS", DEFAULT_WEBHOOK_TIMEOUT)?;

        let defaults = SessionSettings::default();
        let activation_phrase =
            std::env::var("ACTIVATION_PHRASE").unwrap_or(defaults.activation_phrase);
        let assistant_name = std::env::var("ASSISTANT_NAME").unwrap_or(defaults.assistant_name);
        let follow_up_timeout = secs_var("FOLLOW_UP_TIMEOUT_SECS", defaults.follow_up_timeout)?;

        let extra_exit_phrases = std::env::var("EXIT_PHRASES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|phrase| !phrase.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let log_file = std::env::var("LOG_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            webhook_url,
            webhook_method,
            webhook_timeout,
            activation_phrase,
            assistant_name,
            follow_up_timeout,
            extra_exit_phrases,
            log_level,
            log_file,
        })
    }

    /// The part of the configuration the session state machine consumes.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            activation_phrase: self.activation_phrase.clone(),
            assistant_name: self.assistant_name.clone(),
            follow_up_timeout: self.follow_up_timeout,
            extra_exit_phrases: self.extra_exit_phrases.clone(),
            ..SessionSettings::default()
        }
    }
}

/// Reads a positive whole number of seconds, falling back to `default`.
fn secs_var(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("'{}' is not a positive number of seconds", raw),
        )),
    }
}
