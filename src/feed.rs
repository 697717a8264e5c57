//! Ticket update feed.
//!
//! One websocket connection exposed as a lazy, single-consumer stream of
//! decoded messages. Nothing is read from the socket until the consumer
//! polls, and dropping the stream closes the connection.

use std::sync::Arc;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use crate::error::FeedError;

/// Kind of change reported by the feed. Unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateType {
    Created,
    Updated,
    Deleted,
    Other(String),
}

impl From<String> for UpdateType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "created" => UpdateType::Created,
            "updated" => UpdateType::Updated,
            "deleted" => UpdateType::Deleted,
            _         => UpdateType::Other(s),
        }
    }
}

impl From<UpdateType> for String {
    fn from(t: UpdateType) -> Self {
        match t {
            UpdateType::Created  => "created".to_string(),
            UpdateType::Updated  => "updated".to_string(),
            UpdateType::Deleted  => "deleted".to_string(),
            UpdateType::Other(s) => s,
        }
    }
}

/// A structured feed message. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub ticket_id:   Option<String>,
    #[serde(default)]
    pub update_type: Option<UpdateType>,
}

impl TicketUpdateEvent {
    pub fn is_created(&self) -> bool {
        self.update_type == Some(UpdateType::Created)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// One decoded feed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMessage {
    /// JSON object frame
    Update(TicketUpdateEvent),
    /// Plain-text frame, conventionally a bare ticket id
    Raw(String),
}

impl FeedMessage {
    /// Frames that look like a JSON object must decode as one; anything
    /// else is passed through as raw text.
    pub fn decode(text: &str) -> Result<Self, FeedError> {
        let trimmed = text.trim();
        if trimmed.starts_with('{') {
            serde_json::from_str(trimmed)
                .map(FeedMessage::Update)
                .map_err(|e| FeedError::Decode(format!("{}: {}", e, truncate(trimmed, 80))))
        } else {
            Ok(FeedMessage::Raw(trimmed.to_string()))
        }
    }

    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            FeedMessage::Update(event) => event.ticket_id.as_deref(),
            FeedMessage::Raw(text)     => Some(text.as_str()),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Called with every decoded message before it is handed to the consumer.
pub type FeedObserver = Arc<dyn Fn(&FeedMessage) + Send + Sync>;

/// The line printed for each update.
pub fn format_update(message: &FeedMessage) -> String {
    format!("Ticket update received! Ticket ID: {}", message.ticket_id().unwrap_or("<none>"))
}

/// Observer that prints each update to stdout.
pub fn print_update(message: &FeedMessage) {
    println!("{}", format_update(message));
}

pub struct TicketFeed {
    url:      String,
    socket:   WebSocketStream<MaybeTlsStream<TcpStream>>,
    observer: Option<FeedObserver>,
}

impl TicketFeed {
    /// Opens the websocket connection.
    pub async fn connect(url: &str) -> Result<Self, FeedError> {
        tracing::info!(url = %url, "connecting to ticket feed");

        let (socket, _) = connect_async(url).await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "failed to connect to ticket feed");
            FeedError::Connect { url: url.to_string(), message: e.to_string() }
        })?;

        tracing::info!(url = %url, "ticket feed connection established");
        Ok(Self { url: url.to_string(), socket, observer: None })
    }

    pub fn with_observer(mut self, observer: FeedObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Attaches the stdout observer.
    pub fn print_updates(self) -> Self {
        self.with_observer(Arc::new(print_update))
    }

    /// Consumes the connection into a stream of decoded messages.
    ///
    /// The stream ends quietly when the server closes the connection. A
    /// transport or decode error is yielded once and then the stream ends.
    pub fn into_stream(self) -> BoxStream<'static, Result<FeedMessage, FeedError>> {
        stream::unfold(Some(self), |feed| async move {
            let mut feed = feed?;
            loop {
                match feed.socket.next().await {
                    Some(Ok(Message::Text(text))) => return Some(feed.emit(&text)),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => return Some(feed.emit(&text)),
                        Err(_) => {
                            tracing::debug!(url = %feed.url, "skipping non-utf8 binary frame");
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(url = %feed.url, frame = ?frame, "ticket feed connection closed");
                        return None;
                    }
                    // ping / pong / raw frames
                    Some(Ok(_)) => {}
                    Some(Err(WsError::ConnectionClosed)) | Some(Err(WsError::AlreadyClosed)) | None => {
                        tracing::info!(url = %feed.url, "ticket feed connection closed");
                        return None;
                    }
                    Some(Err(e)) => {
                        tracing::error!(url = %feed.url, error = %e, "ticket feed error");
                        return Some((Err(FeedError::Transport(e.to_string())), None));
                    }
                }
            }
        })
        .boxed()
    }

    /// Drives the feed until it closes, returning the number of messages seen.
    pub async fn listen(self) -> Result<usize, FeedError> {
        let mut stream = self.into_stream();
        let mut seen = 0;
        while let Some(item) = stream.next().await {
            item?;
            seen += 1;
        }
        Ok(seen)
    }

    fn emit(self, text: &str) -> (Result<FeedMessage, FeedError>, Option<Self>) {
        match FeedMessage::decode(text) {
            Ok(message) => {
                tracing::debug!(url = %self.url, ticket_id = ?message.ticket_id(), "ticket update received");
                if let Some(observer) = &self.observer {
                    observer(&message);
                }
                (Ok(message), Some(self))
            }
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "ticket feed error");
                (Err(e), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_line_shows_only_the_ticket_id() {
        let update = FeedMessage::decode(r#"{"ticketId":"t-9","updateType":"updated"}"#).unwrap();
        assert_eq!(format_update(&update), "Ticket update received! Ticket ID: t-9");

        let raw = FeedMessage::decode("t-10").unwrap();
        assert_eq!(format_update(&raw), "Ticket update received! Ticket ID: t-10");

        let anonymous = FeedMessage::decode(r#"{"updateType":"created"}"#).unwrap();
        assert_eq!(format_update(&anonymous), "Ticket update received! Ticket ID: <none>");
    }

    #[test]
    fn decodes_created_event_and_ignores_unknown_fields() {
        let msg = FeedMessage::decode(r#"{"ticketId":"t-1","updateType":"created","extra":true}"#).unwrap();
        match msg {
            FeedMessage::Update(event) => {
                assert_eq!(event.ticket_id.as_deref(), Some("t-1"));
                assert!(event.is_created());
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn missing_update_type_is_not_created() {
        let msg = FeedMessage::decode(r#"{"ticketId":42}"#).unwrap();
        assert_eq!(msg, FeedMessage::Update(TicketUpdateEvent {
            ticket_id:   Some("42".to_string()),
            update_type: None,
        }));
    }

    #[test]
    fn unknown_update_type_is_preserved() {
        let msg = FeedMessage::decode(r#"{"ticketId":"a","updateType":"archived"}"#).unwrap();
        let FeedMessage::Update(event) = msg else { panic!("expected update") };
        assert_eq!(event.update_type, Some(UpdateType::Other("archived".to_string())));
        assert!(!event.is_created());
    }

    #[test]
    fn plain_text_is_raw_ticket_id() {
        let msg = FeedMessage::decode("1a2b3c4d\n").unwrap();
        assert_eq!(msg, FeedMessage::Raw("1a2b3c4d".to_string()));
        assert_eq!(msg.ticket_id(), Some("1a2b3c4d"));
    }

    #[test]
    fn broken_json_object_is_decode_error() {
        let err = FeedMessage::decode(r#"{"ticketId": "#).unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }
}
