//! Main Entrypoint for the Auxilia Voice Assistant
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging to the console and, optionally, a log file.
//! 3. Building the webhook client and the speech engines.
//! 4. Running the session until an exit command or end of input.

use anyhow::Context;
use auxilia_core::{Session, router::InteractionRouter, webhook::HttpWebhook};
use auxilia_service::{
    config::Config,
    console::{ConsoleSpeechToText, ConsoleTextToSpeech},
};
use clap::Parser;
use std::{fs::OpenOptions, io, path::Path, sync::Mutex};
use tracing::{Level, info};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Voice assistant that forwards spoken commands to an automation webhook"
)]
struct Args {
    /// Environment name; `.env.<APP_ENV>` is loaded before `.env`.
    #[arg(long, default_value = "dev")]
    app_env: String,
}

/// Logs to stderr, keeping stdout for the assistant's spoken lines, and
/// mirrors everything into `log_file` when one is configured.
fn init_logging(level: Level, log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(
            fmt::layer()
                .with_timer(ChronoLocal::rfc_3339())
                .with_writer(io::stderr),
        )
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- 1. Load Configuration ---
    let config = Config::load(&args.app_env).context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    init_logging(config.log_level, config.log_file.as_deref())?;
    info!(app_env = %args.app_env, "Configuration loaded. Initializing assistant...");

    // --- 3. Initialize Collaborators ---
    let webhook = HttpWebhook::new(
        config.webhook_url.as_str(),
        config.webhook_method,
        config.webhook_timeout,
    )
    .context("Failed to create webhook client")?;
    info!(
        webhook_url = %webhook.url(),
        method = %config.webhook_method,
        "Webhook client ready."
    );
    let listener = ConsoleSpeechToText::stdin().context("Failed to start console input")?;
    let speaker = ConsoleTextToSpeech::stdout(config.assistant_name.as_str());

    let mut session = Session::new(
        config.session_settings(),
        InteractionRouter::new(Box::new(webhook)),
        Box::new(listener.clone()),
        Box::new(listener),
        Box::new(speaker),
    );

    // --- 4. Run ---
    info!(
        activation_phrase = %config.activation_phrase,
        assistant = %config.assistant_name,
        "Assistant configured. Starting session..."
    );
    session.run();

    info!("Assistant has shut down.");
    Ok(())
}
