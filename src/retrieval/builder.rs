// src/retrieval/builder.rs
// Offline index construction for the `index` command. The server never calls this.

use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use super::{IndexedPassage, VectorIndex};
use crate::error::{ChatError, Result};
use crate::llm::Embedder;

/// File extensions picked up from the source directory
const SOURCE_EXTENSIONS: &[&str] = &["md", "txt"];

/// Break points tried from the end of a window, coarsest first
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Split text into chunks of at most `chunk_size` characters with
/// `chunk_overlap` characters shared between neighbours.
///
/// Chunks end on a paragraph, line or word boundary when one falls inside
/// the window, otherwise exactly at `chunk_size`.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let chunk_size = chunk_size.max(1);
    let overlap = chunk_overlap.min(chunk_size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let window_end = (start + chunk_size).min(chars.len());
        let end = if window_end == chars.len() {
            window_end
        } else {
            find_break(&chars[start..window_end])
                .map(|offset| start + offset)
                .unwrap_or(window_end)
        };

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

// Offset of the last separator inside the window, ignoring one at offset 0
fn find_break(window: &[char]) -> Option<usize> {
    for sep in SEPARATORS {
        let sep: Vec<char> = sep.chars().collect();
        if window.len() < sep.len() {
            continue;
        }
        let found = (1..=window.len() - sep.len())
            .rev()
            .find(|&i| window[i..i + sep.len()] == sep[..]);
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Chunk every `.md`/`.txt` file under `source_dir` and embed the chunks
pub async fn build_index(
    source_dir: &Path,
    embedder: &dyn Embedder,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<VectorIndex> {
    if !source_dir.is_dir() {
        return Err(ChatError::Config(format!(
            "source directory not found: {}",
            source_dir.display()
        )));
    }

    let mut files: Vec<_> = WalkDir::new(source_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut passages = Vec::new();
    for path in &files {
        let text = std::fs::read_to_string(path)?;
        let relative = path
            .strip_prefix(source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        for (n, chunk) in split_text(&text, chunk_size, chunk_overlap).into_iter().enumerate() {
            passages.push(IndexedPassage {
                id: format!("{}#{}", relative, n),
                content: chunk,
                source: Some(relative.clone()),
                embedding: Vec::new(),
            });
        }
    }
    info!("Chunked {} files into {} passages", files.len(), passages.len());

    let contents: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
    let embeddings = embedder.embed_batch(&contents).await?;
    if embeddings.len() != passages.len() {
        return Err(ChatError::Embedding(format!(
            "expected {} embeddings, got {}",
            passages.len(),
            embeddings.len()
        )));
    }

    let dimensions = embeddings.first().map(|e| e.len()).unwrap_or(0);
    for (passage, embedding) in passages.iter_mut().zip(embeddings) {
        passage.embedding = embedding;
    }

    let origin = source_dir.display().to_string();
    Ok(VectorIndex::new(embedder.model(), dimensions, passages, &origin)?)
}
