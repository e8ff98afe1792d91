// src/retrieval/qdrant.rs
// Retriever backed by an existing Qdrant collection

use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::qdrant::SearchPointsBuilder;
use qdrant_client::Qdrant;
use tracing::{debug, info};

use super::{RetrievedPassage, Retriever, VectorStoreError};
use crate::error::Result;
use crate::llm::Embedder;

/// Payload key holding the passage text
const CONTENT_KEY: &str = "content";
/// Payload key holding the passage origin
const SOURCE_KEY: &str = "source";

pub struct QdrantRetriever {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl QdrantRetriever {
    /// Connect and require the collection to exist. Nothing is created here.
    pub async fn connect(
        url: &str,
        collection: &str,
        embedder: Arc<dyn Embedder>,
    ) -> std::result::Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .skip_compatibility_check()
            .build()
            .map_err(|e| VectorStoreError::Qdrant(e.to_string()))?;

        let exists = client
            .collection_exists(collection)
            .await
            .map_err(|e| VectorStoreError::Qdrant(e.to_string()))?;
        if !exists {
            return Err(VectorStoreError::CollectionMissing(collection.to_string()));
        }

        info!("Connected to Qdrant at {} (collection {})", url, collection);
        Ok(Self {
            client,
            collection: collection.to_string(),
            embedder,
        })
    }
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        if k == 0 {
            return Ok(vec![]);
        }
        let embedding = self.embedder.embed(query).await?;

        let search = SearchPointsBuilder::new(self.collection.as_str(), embedding, k as u64)
            .with_payload(true);
        let results = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::Qdrant(e.to_string()))?;

        let passages: Vec<RetrievedPassage> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let content = point.payload.get(CONTENT_KEY)?.as_str()?.to_string();
                let source = point
                    .payload
                    .get(SOURCE_KEY)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                Some(RetrievedPassage {
                    content,
                    source,
                    score: point.score,
                })
            })
            .collect();

        debug!("Retrieved {} passages from {}", passages.len(), self.collection);
        Ok(passages)
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }
}
