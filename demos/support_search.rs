//! # Support Document Search
//!
//! Indexes every file under `./support-info` and prints the documents
//! nearest to a query.
//!
//! # Usage
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run --example support_search -- "conveyor belt slipping"
//! ```

use std::sync::Arc;
use helpdesk_agent::{load_directory, ApiKey, ClientConfig, InMemoryVectorStore, OpenAiEmbedder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let query = std::env::args().nth(1)
        .unwrap_or_else(|| "machine makes a grinding noise".to_string());

    let api_key = ApiKey::resolve()?;
    let config = ClientConfig::default();

    let docs = load_directory(&config.corpus_dir)?;
    println!("Loaded {} documents from {}", docs.len(), config.corpus_dir.display());

    let embedder = OpenAiEmbedder::new(&api_key).model(config.embedding_model.clone());
    let mut store = InMemoryVectorStore::new(Arc::new(embedder));
    store.add_documents(docs).await?;

    for hit in store.similarity_search(&query, 4).await? {
        let preview: String = hit.document.text.chars().take(120).collect();
        println!("{:.4}  {}\n        {}", hit.distance, hit.document.source.display(), preview.replace('\n', " "));
    }
    Ok(())
}
