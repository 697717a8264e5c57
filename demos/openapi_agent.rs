//! # OpenAPI Agent
//!
//! Downloads the ticketing system's OpenAPI description and lets the model
//! act on a natural-language instruction against it.
//!
//! # Usage
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run --example openapi_agent -- "List all open tickets"
//! ```
//! Without `OPENAI_API_KEY` the key is prompted for on the terminal.

use std::sync::Arc;
use helpdesk_agent::{
    fetch_service_description, ApiKey, ClientConfig, HttpMethod, OpenAiCaller, OpenApiAgent,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let instruction = std::env::args().nth(1)
        .unwrap_or_else(|| "Get all tickets and summarize how many there are per status.".to_string());

    let api_key = ApiKey::resolve()?;
    let config = ClientConfig::default();
    let http_client = reqwest::Client::new();

    let description = fetch_service_description(&http_client, &config.api_root).await?;
    println!("API: {} ({} endpoints)", config.api_root, description.endpoints.len());

    let agent = OpenApiAgent::builder(description)
        .llm(Arc::new(OpenAiCaller::with_api_key(&api_key)))
        .http_client(http_client)
        .model(config.chat_model.clone())
        .verbose(true)
        .allow_dangerous_requests(true)
        .handle_parsing_errors(true)
        .allow_operations(HttpMethod::ALL)
        .build()?;

    let answer = agent.invoke(&instruction).await;
    println!("\n{}", answer);
    Ok(())
}
