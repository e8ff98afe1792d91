// src/retrieval/mod.rs
// Read-only similarity index, loaded once at startup

pub mod builder;
pub mod error;
pub mod local;
pub mod qdrant;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{ChatbotConfig, VectorBackend};
use crate::error::Result;
use crate::llm::Embedder;

pub use error::VectorStoreError;
pub use local::{IndexedPassage, LocalRetriever, VectorIndex};
pub use qdrant::QdrantRetriever;

/// File name of the local index inside the vector store directory
pub const INDEX_FILE_NAME: &str = "index.json";

/// Text embedded at startup to prove the embedding backend is reachable
const PROBE_TEXT: &str = "hokejlogic";

/// A ranked passage returned by a retriever
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPassage {
    pub content: String,
    pub source: Option<String>,
    pub score: f32,
}

/// Top-K similarity search over precomputed passages
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` passages most similar to `query`, best first
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>>;

    /// Vector dimensionality, when the backend knows it
    fn dimensions(&self) -> Option<usize>;
}

/// Load the configured retriever and check the embedding backend answers.
///
/// Any error here means the process must not start.
pub async fn load_retriever(
    config: &ChatbotConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn Retriever>> {
    let retriever: Arc<dyn Retriever> = match config.vector_backend {
        VectorBackend::Local => {
            let index = VectorIndex::load(&config.index_file())?;
            info!(
                "Loaded vector store: {} passages ({}D, {})",
                index.len(),
                index.dimensions(),
                index.embedding_model()
            );
            Arc::new(LocalRetriever::new(index, embedder.clone()))
        }
        VectorBackend::Qdrant => Arc::new(
            QdrantRetriever::connect(&config.qdrant_url, &config.qdrant_collection, embedder.clone())
                .await?,
        ),
    };

    probe_embedder(embedder.as_ref(), retriever.dimensions()).await?;
    Ok(retriever)
}

/// Embed a probe text and compare its size to the index
pub async fn probe_embedder(embedder: &dyn Embedder, expected: Option<usize>) -> Result<()> {
    let vector = embedder.embed(PROBE_TEXT).await?;
    if let Some(expected) = expected {
        if vector.len() != expected {
            return Err(VectorStoreError::EmbedderMismatch {
                expected,
                actual: vector.len(),
            }
            .into());
        }
    }
    info!("Embedding backend reachable ({})", embedder.model());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use tempfile::TempDir;

    /// Embeds text as [length, 1.0, 0.0]
    struct LengthEmbedder {
        dims: usize,
    }

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; self.dims];
                    v[0] = t.chars().count() as f32;
                    if self.dims > 1 {
                        v[1] = 1.0;
                    }
                    v
                })
                .collect())
        }

        fn model(&self) -> &str {
            "length"
        }
    }

    #[tokio::test]
    async fn test_probe_detects_dimension_mismatch() {
        let embedder = LengthEmbedder { dims: 3 };
        assert!(probe_embedder(&embedder, Some(3)).await.is_ok());
        assert!(probe_embedder(&embedder, None).await.is_ok());

        let err = probe_embedder(&embedder, Some(1536)).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::VectorStore(VectorStoreError::EmbedderMismatch { expected: 1536, actual: 3 })
        ));
    }

    #[tokio::test]
    async fn test_load_retriever_requires_index_file() {
        let dir = TempDir::new().unwrap();
        let mut config = ChatbotConfig::new("sk-test", "admin");
        config.vector_store_path = dir.path().to_path_buf();

        let embedder: Arc<dyn Embedder> = Arc::new(LengthEmbedder { dims: 2 });
        let err = load_retriever(&config, embedder).await.err().unwrap();
        assert!(matches!(err, ChatError::VectorStore(VectorStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_build_then_load_local_index() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join("hraci.md"), "Sekce Hráči obsahuje tabulky.").unwrap();
        std::fs::create_dir(source.path().join("sub")).unwrap();
        std::fs::write(source.path().join("sub/tymy.txt"), "Týmy").unwrap();
        std::fs::write(source.path().join("ignored.json"), "{}").unwrap();

        let embedder: Arc<dyn Embedder> = Arc::new(LengthEmbedder { dims: 2 });
        let index = builder::build_index(source.path(), embedder.as_ref(), 1000, 200)
            .await
            .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.passages()[1].id, "sub/tymy.txt#0");

        let store = TempDir::new().unwrap();
        let mut config = ChatbotConfig::new("sk-test", "admin");
        config.vector_store_path = store.path().to_path_buf();
        index.save(&config.index_file()).unwrap();

        let retriever = load_retriever(&config, embedder).await.unwrap();
        assert_eq!(retriever.dimensions(), Some(2));

        let results = retriever.retrieve("Týmy", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "Týmy");
        assert_eq!(results[0].source.as_deref(), Some("sub/tymy.txt"));
    }
}
