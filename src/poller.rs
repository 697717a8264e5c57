//! Polling fallback for the ticket list.

use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;
use crate::error::ClientError;

/// Where the poller gets its ticket payloads from.
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn fetch_tickets(&self) -> Result<Value, ClientError>;
}

/// `GET <root>/api/tickets` over HTTP.
#[derive(Clone)]
pub struct HttpTicketSource {
    http_client: reqwest::Client,
    url:         String,
}

impl HttpTicketSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http_client, url: url.into() }
    }
}

#[async_trait]
impl TicketSource for HttpTicketSource {
    async fn fetch_tickets(&self) -> Result<Value, ClientError> {
        tracing::debug!(url = %self.url, "fetching tickets");

        let resp = self.http_client.get(&self.url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server { status: status.as_u16(), body });
        }

        Ok(resp.json::<Value>().await?)
    }
}

pub struct TicketPoller<S> {
    source:   S,
    interval: Duration,
}

impl<S: TicketSource> TicketPoller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self { source, interval }
    }

    pub async fn poll_once(&self) -> Result<Value, ClientError> {
        self.source.fetch_tickets().await
    }

    /// Polls forever: fetch, hand the payload to `handler`, sleep.
    ///
    /// Failures are logged and the next attempt happens after the same
    /// fixed interval. Only cancelling the future stops the loop.
    pub async fn run<F>(&self, mut handler: F)
    where
        F: FnMut(Value) + Send,
    {
        tracing::info!(interval_s = self.interval.as_secs_f64(), "ticket poller started");
        loop {
            match self.poll_once().await {
                Ok(tickets) => handler(tickets),
                Err(e) => tracing::warn!(error = %e, "ticket poll failed"),
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
