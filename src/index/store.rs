use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// One indexed chunk as persisted in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub chunk_id: String,
    pub content: String,
    /// File name or URL the chunk came from.
    pub source: String,
    /// PDF page number when the source is a PDF.
    pub page: Option<u32>,
    /// sha256 of the content, used to drop duplicate chunks within a
    /// collection.
    pub content_hash: String,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Storage backend for named vector collections. Rebuilding an index clears
/// its collection and re-inserts.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings; duplicates (same collection and
    /// content hash) are skipped. Returns how many rows were inserted.
    async fn insert_batch(
        &self,
        collection: &str,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<usize, ApiError>;

    /// Chunks most similar to the query embedding, best first.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError>;

    /// Delete every chunk in the collection. Returns how many were removed.
    async fn clear_collection(&self, collection: &str) -> Result<usize, ApiError>;

    /// Number of chunks in the collection.
    async fn count(&self, collection: &str) -> Result<usize, ApiError>;
}
