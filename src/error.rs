use thiserror::Error;
use crate::types::State;
use crate::events::Event;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent failed: {0}")]
    AgentFailed(String),

    #[error("Invalid transition: {from} + {event} not in transition table")]
    InvalidTransition { from: State, event: Event },

    #[error("No handler registered for state: {0}")]
    NoHandlerForState(String),

    #[error("Safety cap exceeded after {0} iterations")]
    SafetyCapExceeded(usize),

    #[error("Build error: {0}")]
    BuildError(String),
}

/// Failures of the HTTP-facing client flows (polling, OpenAPI download,
/// corpus loading and embedding).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid API description: {0}")]
    InvalidDescription(String),

    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Failures of the ticket update feed. Remote closure is not an error.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("websocket error: {0}")]
    Transport(String),

    #[error("undecodable feed message: {0}")]
    Decode(String),
}
