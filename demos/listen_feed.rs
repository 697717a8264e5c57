//! # Ticket Feed Listener
//!
//! Connects to the ticket update websocket and prints every update until the
//! server closes the connection.
//!
//! # Usage
//! ```bash
//! cargo run --example listen_feed
//! RUST_LOG=debug cargo run --example listen_feed
//! ```

use helpdesk_agent::{ClientConfig, TicketFeed};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::default();

    let seen = TicketFeed::connect(&config.feed_url).await?
        .print_updates()
        .listen()
        .await?;

    println!("Feed closed after {} updates.", seen);
    Ok(())
}
