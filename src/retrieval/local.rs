// src/retrieval/local.rs
// Flat file-backed index scanned with cosine similarity

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RetrievedPassage, Retriever, VectorStoreError};
use crate::error::Result;
use crate::llm::embeddings::utils::cosine_similarity;
use crate::llm::Embedder;

/// One chunk of source text with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub embedding: Vec<f32>,
}

/// On-disk layout of `index.json`
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    embedding_model: String,
    dimensions: usize,
    passages: Vec<IndexedPassage>,
}

/// Validated in-memory index. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    embedding_model: String,
    dimensions: usize,
    passages: Vec<IndexedPassage>,
}

impl VectorIndex {
    /// Build an index, checking every vector against `dimensions`
    pub fn new(
        embedding_model: impl Into<String>,
        dimensions: usize,
        passages: Vec<IndexedPassage>,
        origin: &str,
    ) -> std::result::Result<Self, VectorStoreError> {
        if passages.is_empty() {
            return Err(VectorStoreError::Empty(origin.to_string()));
        }

        for passage in &passages {
            if passage.embedding.len() != dimensions {
                return Err(VectorStoreError::DimensionMismatch {
                    id: passage.id.clone(),
                    expected: dimensions,
                    actual: passage.embedding.len(),
                });
            }
            if passage.embedding.iter().any(|v| !v.is_finite()) {
                return Err(VectorStoreError::NonFiniteValues(passage.id.clone()));
            }
        }

        Ok(Self {
            embedding_model: embedding_model.into(),
            dimensions,
            passages,
        })
    }

    /// Read and validate an index file
    pub fn load(path: &Path) -> std::result::Result<Self, VectorStoreError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(VectorStoreError::NotFound(display));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| VectorStoreError::Read {
            path: display.clone(),
            source,
        })?;
        let file: IndexFile = serde_json::from_str(&raw).map_err(|source| VectorStoreError::Parse {
            path: display.clone(),
            source,
        })?;

        Self::new(file.embedding_model, file.dimensions, file.passages, &display)
    }

    /// Write the index as JSON, creating parent directories
    pub fn save(&self, path: &Path) -> std::result::Result<(), VectorStoreError> {
        let display = path.display().to_string();
        let write_err = |source| VectorStoreError::Write {
            path: display.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file = IndexFile {
            embedding_model: self.embedding_model.clone(),
            dimensions: self.dimensions,
            passages: self.passages.clone(),
        };
        let json = serde_json::to_string(&file).map_err(|e| VectorStoreError::Write {
            path: display.clone(),
            source: std::io::Error::other(e),
        })?;
        std::fs::write(path, json).map_err(write_err)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn passages(&self) -> &[IndexedPassage] {
        &self.passages
    }

    /// Top-k passages by cosine similarity; ties keep index order
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedPassage> {
        let mut scored: Vec<(f32, &IndexedPassage)> = self
            .passages
            .iter()
            .map(|p| (cosine_similarity(query, &p.embedding), p))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(score, p)| RetrievedPassage {
                content: p.content.clone(),
                source: p.source.clone(),
                score,
            })
            .collect()
    }
}

/// Retriever over a `VectorIndex`; embeds the query, then scans
pub struct LocalRetriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
}

impl LocalRetriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }
}

#[async_trait]
impl Retriever for LocalRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        if k == 0 {
            return Ok(vec![]);
        }
        let embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&embedding, k);
        debug!("Retrieved {} passages (k={})", results.len(), k);
        Ok(results)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.index.dimensions())
    }
}
