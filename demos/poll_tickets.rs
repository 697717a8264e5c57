//! # Ticket Poller
//!
//! Fetches the ticket list every ten seconds and prints it. Runs until
//! interrupted with Ctrl-C.
//!
//! # Usage
//! ```bash
//! cargo run --example poll_tickets
//! ```

use helpdesk_agent::{ClientConfig, HttpTicketSource, TicketPoller};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::default();
    let poller = TicketPoller::new(HttpTicketSource::new(config.tickets_url()), config.poll_interval);

    tokio::select! {
        _ = poller.run(|tickets| {
            println!("Fetched tickets: {}", serde_json::to_string_pretty(&tickets).unwrap_or_default());
        }) => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Stopping poller.");
        }
    }

    Ok(())
}
