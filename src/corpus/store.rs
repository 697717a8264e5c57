use std::sync::Arc;
use crate::corpus::embeddings::{cosine_similarity, Embedder};
use crate::corpus::loader::SupportDocument;
use crate::error::ClientError;

/// Number of documents [`InMemoryVectorStore::retrieve`] returns.
pub const DEFAULT_TOP_K: usize = 4;

/// A search hit. `distance` is `1 - cosine similarity`: 0 for identical
/// directions, up to 2 for opposite ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: SupportDocument,
    pub distance: f32,
}

struct StoredDocument {
    document:  SupportDocument,
    embedding: Vec<f32>,
}

/// Append-only, session-scoped similarity index.
pub struct InMemoryVectorStore {
    embedder:  Arc<dyn Embedder>,
    entries:   Vec<StoredDocument>,
    dimension: Option<usize>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, entries: Vec::new(), dimension: None }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Embeds `docs` in one batch and adds them. Nothing is added if any
    /// embedding fails or has the wrong dimension.
    pub async fn add_documents(&mut self, docs: Vec<SupportDocument>) -> Result<usize, ClientError> {
        if docs.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        if embeddings.len() != docs.len() {
            return Err(ClientError::Embedding(format!(
                "embedder returned {} vectors for {} documents", embeddings.len(), docs.len()
            )));
        }

        let mut dimension = self.dimension;
        for embedding in &embeddings {
            let expected = *dimension.get_or_insert(embedding.len());
            if embedding.len() != expected || expected == 0 {
                return Err(ClientError::Embedding(format!(
                    "embedding dimension {} does not match index dimension {}", embedding.len(), expected
                )));
            }
        }
        self.dimension = dimension;

        let added = docs.len();
        self.entries.extend(docs.into_iter().zip(embeddings).map(|(document, embedding)| {
            StoredDocument { document, embedding }
        }));

        tracing::info!(added, total = self.entries.len(), "documents indexed");
        Ok(added)
    }

    /// The `k` stored documents nearest to `query`, nearest first.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, ClientError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;
        if Some(query_embedding.len()) != self.dimension {
            return Err(ClientError::Embedding(format!(
                "query embedding dimension {} does not match index dimension {:?}",
                query_embedding.len(), self.dimension
            )));
        }

        let mut hits: Vec<ScoredDocument> = self.entries.iter()
            .map(|entry| ScoredDocument {
                document: entry.document.clone(),
                distance: 1.0 - cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        tracing::debug!(query = %query, hits = hits.len(), "similarity search");
        Ok(hits)
    }

    /// Retriever-style lookup: the [`DEFAULT_TOP_K`] nearest documents.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SupportDocument>, ClientError> {
        Ok(self.similarity_search(query, DEFAULT_TOP_K).await?
            .into_iter()
            .map(|hit| hit.document)
            .collect())
    }
}
