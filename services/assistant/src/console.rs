//! Text stand-ins for the speech engines, so the assistant can be driven from
//! a terminal without audio hardware.

use auxilia_core::error::{AssistantError, Result};
use auxilia_core::speech::{ListeningRequest, SpeechToText, TextToSpeech};
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// "Recognizes" speech by reading lines of text.
///
/// Lines are read on a background thread so that `listen` can honour a
/// timeout. Clones share the same input, which lets one console serve both
/// the activation and the command listener.
#[derive(Clone)]
pub struct ConsoleSpeechToText {
    lines: Receiver<String>,
}

/// Lines buffered ahead of the listener.
const INPUT_BUFFER_LINES: usize = 32;

impl ConsoleSpeechToText {
    /// Reads from the process's standard input.
    pub fn stdin() -> io::Result<Self> {
        Self::from_reader(BufReader::new(io::stdin()))
    }

    pub fn from_reader<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = bounded(INPUT_BUFFER_LINES);
        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read console input");
                            break;
                        }
                    }
                }
                debug!("Console input closed");
            })?;
        Ok(Self { lines: rx })
    }
}

impl SpeechToText for ConsoleSpeechToText {
    fn listen(&self, request: &ListeningRequest) -> Result<String> {
        debug!(
            timeout = ?request.timeout,
            phrase_time_limit = ?request.phrase_time_limit,
            "Waiting for console input"
        );
        let deadline = request.timeout.map(|timeout| (timeout, Instant::now() + timeout));

        loop {
            let line = match deadline {
                None => self.lines.recv().map_err(|_| AssistantError::InputClosed)?,
                Some((timeout, deadline)) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.lines.recv_timeout(remaining) {
                        Ok(line) => line,
                        Err(RecvTimeoutError::Timeout) => {
                            return Err(AssistantError::ListeningTimeout(timeout));
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(AssistantError::InputClosed);
                        }
                    }
                }
            };

            let text = line.trim();
            if !text.is_empty() {
                return Ok(text.to_string());
            }
        }
    }
}

/// "Speaks" by printing `<name>: <text>` lines.
pub struct ConsoleTextToSpeech {
    speaker: String,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleTextToSpeech {
    pub fn stdout(speaker: impl Into<String>) -> Self {
        Self::with_writer(speaker, io::stdout())
    }

    pub fn with_writer(speaker: impl Into<String>, out: impl Write + Send + 'static) -> Self {
        Self {
            speaker: speaker.into(),
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl TextToSpeech for ConsoleTextToSpeech {
    fn speak(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| AssistantError::Synthesis("Console output lock poisoned".to_string()))?;
        writeln!(out, "{}: {}", self.speaker, text)
            .and_then(|_| out.flush())
            .map_err(|e| AssistantError::Synthesis(e.to_string()))
    }
}
