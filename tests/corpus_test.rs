use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use helpdesk_agent::{load_directory, ClientError, Embedder, InMemoryVectorStore, SupportDocument};
use tempfile::TempDir;

/// Looks embeddings up in a fixed table and counts batches.
struct TableEmbedder {
    table:   HashMap<String, Vec<f32>>,
    batches: Mutex<usize>,
}

impl TableEmbedder {
    fn new(entries: &[(&str, Vec<f32>)]) -> Arc<Self> {
        Arc::new(Self {
            table:   entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            batches: Mutex::new(0),
        })
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClientError> {
        *self.batches.lock().unwrap() += 1;
        texts.iter()
            .map(|t| self.table.get(t).cloned()
                .ok_or_else(|| ClientError::Embedding(format!("no embedding for {:?}", t))))
            .collect()
    }
}

fn doc(name: &str, text: &str) -> SupportDocument {
    SupportDocument { source: PathBuf::from(name), text: text.to_string() }
}

#[tokio::test]
async fn nearest_document_comes_first() {
    let embedder = TableEmbedder::new(&[
        ("A", vec![1.0, 0.0]),
        ("B", vec![0.0, 1.0]),
        ("query", vec![0.9, 0.1]),
    ]);
    let mut store = InMemoryVectorStore::new(embedder.clone());

    let added = store.add_documents(vec![doc("b.md", "B"), doc("a.md", "A")]).await.unwrap();
    assert_eq!(added, 2);
    assert_eq!(store.dimension(), Some(2));
    assert_eq!(*embedder.batches.lock().unwrap(), 1);

    let hits = store.similarity_search("query", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].document.text, "A");
    assert_eq!(hits[1].document.text, "B");
    assert!(hits[0].distance < hits[1].distance);

    let top = store.similarity_search("query", 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].document.source, PathBuf::from("a.md"));
}

#[tokio::test]
async fn empty_store_returns_no_hits() {
    let store = InMemoryVectorStore::new(TableEmbedder::new(&[]));
    assert!(store.similarity_search("anything", 4).await.unwrap().is_empty());
    assert!(store.retrieve("anything").await.unwrap().is_empty());
}

#[tokio::test]
async fn mismatched_dimension_is_rejected() {
    let embedder = TableEmbedder::new(&[
        ("A", vec![1.0, 0.0]),
        ("C", vec![1.0, 0.0, 0.0]),
        ("query3", vec![0.0, 0.0, 1.0]),
    ]);
    let mut store = InMemoryVectorStore::new(embedder);

    store.add_documents(vec![doc("a.md", "A")]).await.unwrap();

    let err = store.add_documents(vec![doc("c.md", "C")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Embedding(_)));
    assert_eq!(store.len(), 1);

    let err = store.similarity_search("query3", 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Embedding(_)));
}

#[tokio::test]
async fn failed_batch_adds_nothing() {
    let embedder = TableEmbedder::new(&[("A", vec![1.0, 0.0])]);
    let mut store = InMemoryVectorStore::new(embedder);

    let err = store.add_documents(vec![doc("a.md", "A"), doc("x.md", "unknown")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Embedding(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn loaded_directory_is_searchable() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("machines")).unwrap();
    std::fs::write(tmp.path().join("machines/belt.md"), "belt").unwrap();
    std::fs::write(tmp.path().join("printer.txt"), "printer").unwrap();

    let embedder = TableEmbedder::new(&[
        ("belt", vec![1.0, 0.0, 0.0]),
        ("printer", vec![0.0, 1.0, 0.0]),
        ("conveyor noise", vec![0.8, 0.2, 0.0]),
    ]);

    let docs = load_directory(tmp.path()).unwrap();
    assert_eq!(docs.len(), 2);

    let mut store = InMemoryVectorStore::new(embedder);
    store.add_documents(docs).await.unwrap();

    let found = store.retrieve("conveyor noise").await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[0].source.ends_with("machines/belt.md"));
}
