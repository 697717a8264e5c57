use async_openai::{
    config::OpenAIConfig,
    types::CreateEmbeddingRequestArgs,
    Client,
};
use async_trait::async_trait;
use crate::config::{ApiKey, DEFAULT_EMBEDDING_MODEL};
use crate::error::ClientError;

/// Turns text into fixed-dimension vectors. Documents and queries must be
/// embedded by the same model for distances to mean anything.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClientError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        self.embed_documents(&[text.to_string()]).await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Embedding("no embedding returned for query".to_string()))
    }
}

pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model:  String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: &ApiKey) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose());
        Self {
            client: Client::with_config(config),
            model:  DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = texts.len(), model = %self.model, "requesting embeddings");

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| ClientError::Embedding(format!("failed to build request: {}", e)))?;

        let response = self.client.embeddings()
            .create(request)
            .await
            .map_err(|e| ClientError::Embedding(format!("OpenAI API error: {}", e)))?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(ClientError::Embedding(format!(
                "expected {} embeddings, got {}", texts.len(), data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
