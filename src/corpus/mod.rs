//! Support document corpus: directory loading, embeddings and an in-memory
//! nearest-neighbour index.

mod embeddings;
mod loader;
mod store;

pub use embeddings::{cosine_similarity, Embedder, OpenAiEmbedder};
pub use loader::{load_directory, SupportDocument};
pub use store::{InMemoryVectorStore, ScoredDocument, DEFAULT_TOP_K};
