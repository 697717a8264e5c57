//! Client configuration.
//!
//! Every parameter has a literal default matching a ticketing system running
//! on `localhost:3000`; setters exist so tests and demos can point elsewhere.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crate::error::ClientError;

pub const DEFAULT_API_ROOT: &str = "http://localhost:3000";
pub const DEFAULT_FEED_URL: &str = "ws://localhost:3000/ws";
pub const TICKETS_PATH: &str = "/api/tickets";
pub const OPENAPI_PATH: &str = "/api/docs/openapi.json";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_CORPUS_DIR: &str = "./support-info";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL of the ticketing REST API, without trailing slash
    pub api_root:        String,
    /// Websocket endpoint of the ticket update feed
    pub feed_url:        String,
    /// Pause between two polls of the ticket list
    pub poll_interval:   Duration,
    /// Directory holding the support documents
    pub corpus_dir:      PathBuf,
    pub chat_model:      String,
    pub embedding_model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root:        DEFAULT_API_ROOT.to_string(),
            feed_url:        DEFAULT_FEED_URL.to_string(),
            poll_interval:   DEFAULT_POLL_INTERVAL,
            corpus_dir:      PathBuf::from(DEFAULT_CORPUS_DIR),
            chat_model:      DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = root.into().trim_end_matches('/').to_string(); self
    }

    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into(); self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval; self
    }

    pub fn corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = dir.into(); self
    }

    pub fn tickets_url(&self) -> String {
        format!("{}{}", self.api_root, TICKETS_PATH)
    }

    pub fn openapi_url(&self) -> String {
        format!("{}{}", self.api_root, OPENAPI_PATH)
    }
}

/// The LLM / embedding provider credential. Never printed: `Debug` is redacted
/// and there is no `Display`.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ClientError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ClientError::Config("an OpenAI API key is required".to_string()));
        }
        Ok(Self(key))
    }

    /// Reads `OPENAI_API_KEY`, falling back to an interactive prompt.
    /// Fails before any network activity when no key is supplied.
    pub fn resolve() -> Result<Self, ClientError> {
        Self::resolve_with(std::env::var(API_KEY_ENV).ok(), Self::prompt)
    }

    fn resolve_with(
        env:    Option<String>,
        prompt: impl FnOnce() -> Result<Self, ClientError>,
    ) -> Result<Self, ClientError> {
        match env {
            Some(key) if !key.trim().is_empty() => Self::new(key),
            _ => prompt(),
        }
    }

    /// Asks for the key on the terminal without echoing it.
    pub fn prompt() -> Result<Self, ClientError> {
        match read_hidden("Enter your OpenAI API key: ") {
            Ok(Some(key)) => Self::new(key),
            Ok(None) => Err(ClientError::Config("API key entry cancelled".to_string())),
            Err(e) => Err(ClientError::Config(format!("cannot read API key: {}", e))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyInput {
    Continue,
    Submit,
    Cancel,
}

/// Folds one key press into the hidden input buffer.
fn apply_key(input: &mut String, key: KeyEvent) -> KeyInput {
    if key.kind != KeyEventKind::Press {
        return KeyInput::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyInput::Submit,
        KeyCode::Esc => KeyInput::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyInput::Cancel,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.push(c);
            KeyInput::Continue
        }
        KeyCode::Backspace => {
            input.pop();
            KeyInput::Continue
        }
        _ => KeyInput::Continue,
    }
}

/// Leaves raw mode when dropped, including on early return.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads one line in raw mode so nothing typed reaches the screen.
/// `None` when the user cancels with Esc or Ctrl-C.
fn read_hidden(label: &str) -> io::Result<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", label)?;
    stderr.flush()?;

    let mut input = String::new();
    let outcome = {
        let _raw = RawMode::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_key(&mut input, key) {
                    KeyInput::Continue => {}
                    done => break done,
                }
            }
        }
    };
    writeln!(stderr)?;

    Ok((outcome == KeyInput::Submit).then_some(input))
}
