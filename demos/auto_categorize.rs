//! # Auto-Categorization
//!
//! Listens for newly created tickets and asks the OpenAPI agent to file each
//! one under Mechanical, Quality, Maintenance or Technical. Tickets are
//! handled one at a time, in feed order.
//!
//! # Usage
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run --example auto_categorize
//! ```

use std::sync::Arc;
use helpdesk_agent::{
    fetch_service_description, run_categorizer, ApiKey, ClientConfig, HttpMethod,
    OpenAiCaller, OpenApiAgent, TicketFeed,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let api_key = ApiKey::resolve()?;
    let config = ClientConfig::default();
    let http_client = reqwest::Client::new();

    let description = fetch_service_description(&http_client, &config.api_root).await?;
    let agent = OpenApiAgent::builder(description)
        .llm(Arc::new(OpenAiCaller::with_api_key(&api_key)))
        .http_client(http_client)
        .model(config.chat_model.clone())
        .verbose(true)
        .allow_dangerous_requests(true)
        .handle_parsing_errors(true)
        .allow_operations(HttpMethod::ALL)
        .build()?;

    let feed = TicketFeed::connect(&config.feed_url).await?
        .print_updates()
        .into_stream();

    let summary = run_categorizer(feed, &agent).await;
    println!(
        "Feed closed: {} updates seen, {} tickets categorized.",
        summary.events_seen, summary.tickets_categorized
    );
    Ok(())
}
