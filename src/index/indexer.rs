use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::Document;
use super::loader;
use super::retriever::{DocumentSource, Retriever};
use super::splitter::TextSplitter;
use super::store::{StoredChunk, VectorStore};
use super::IndexError;
use crate::core::config::IndexSettings;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

const EMBED_BATCH_SIZE: usize = 32;

/// Builds the vector collection from the configured source and hands out
/// retrievers over it. Every `build_index` call rebuilds from scratch;
/// [`IndexHandle`] adds get-or-build caching on top.
pub struct Indexer {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    settings: IndexSettings,
    embedding_model: String,
    documents_dir: PathBuf,
    fetch_client: reqwest::Client,
}

impl Indexer {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        settings: IndexSettings,
        embedding_model: String,
        documents_dir: PathBuf,
        fetch_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let fetch_client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            provider,
            store,
            settings,
            embedding_model,
            documents_dir,
            fetch_client,
        })
    }

    /// Loads the source documents, splits them, clears the collection, and
    /// stores embedded chunks. Returns a retriever over the fresh collection.
    pub async fn build_index(&self) -> Result<Retriever, IndexError> {
        let documents = self.load_source_documents().await?;

        let splitter = TextSplitter::new(self.settings.chunk_tokens, self.settings.chunk_overlap);
        let chunks = splitter.split_documents(&documents);
        tracing::info!(
            "split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        self.store
            .clear_collection(&self.settings.collection)
            .await?;

        let mut inserted = 0usize;
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|d| d.page_content.clone()).collect();
            let embeddings = self.provider.embed(&texts, &self.embedding_model).await?;

            let items: Vec<(StoredChunk, Vec<f32>)> = batch
                .iter()
                .zip(embeddings)
                .map(|(doc, embedding)| (stored_chunk(doc), embedding))
                .collect();

            inserted += self
                .store
                .insert_batch(&self.settings.collection, items)
                .await?;
        }

        tracing::info!(
            collection = %self.settings.collection,
            chunks = inserted,
            "index built"
        );

        Ok(self.retriever())
    }

    /// A retriever over the current collection contents, without rebuilding.
    pub fn retriever(&self) -> Retriever {
        Retriever::new(
            self.provider.clone(),
            self.store.clone(),
            self.settings.collection.clone(),
            self.embedding_model.clone(),
            self.settings.top_k,
        )
    }

    pub async fn chunk_count(&self) -> Result<usize, ApiError> {
        self.store.count(&self.settings.collection).await
    }

    async fn load_source_documents(&self) -> Result<Vec<Document>, IndexError> {
        if self.settings.urls.is_empty() {
            loader::load_pdf_documents(&self.documents_dir, self.settings.max_source_documents)
                .await
        } else {
            loader::load_url_documents(&self.fetch_client, &self.settings.urls).await
        }
    }
}

/// Shared get-or-build wrapper around an [`Indexer`]. The first retriever
/// request builds the index; later requests reuse the collection until
/// `rebuild` or `invalidate`.
pub struct IndexHandle {
    indexer: Indexer,
    cached: RwLock<Option<Retriever>>,
}

impl IndexHandle {
    pub fn new(indexer: Indexer) -> Self {
        Self {
            indexer,
            cached: RwLock::new(None),
        }
    }

    /// Retriever over the current index, building the index on first use.
    pub async fn retriever(&self) -> Result<Retriever, IndexError> {
        if let Some(retriever) = self.cached.read().await.as_ref() {
            return Ok(retriever.clone());
        }

        let mut guard = self.cached.write().await;
        // A concurrent caller may have built it while we waited for the lock.
        if let Some(retriever) = guard.as_ref() {
            return Ok(retriever.clone());
        }

        let retriever = self.indexer.build_index().await?;
        *guard = Some(retriever.clone());
        Ok(retriever)
    }

    /// Rebuild the index from the current source documents. Returns the
    /// number of chunks in the fresh collection.
    pub async fn rebuild(&self) -> Result<usize, IndexError> {
        let mut guard = self.cached.write().await;
        *guard = Some(self.indexer.build_index().await?);
        drop(guard);
        Ok(self.indexer.chunk_count().await?)
    }

    /// Drop the cached retriever so the next request rebuilds the index.
    /// Called after uploads change the source documents.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    pub async fn chunk_count(&self) -> Result<usize, ApiError> {
        self.indexer.chunk_count().await
    }
}

#[async_trait]
impl DocumentSource for IndexHandle {
    async fn get_relevant(&self, query: &str) -> Result<Vec<Document>, ApiError> {
        let retriever = self.retriever().await.map_err(ApiError::from)?;
        retriever.get_relevant(query).await
    }
}

fn stored_chunk(doc: &Document) -> StoredChunk {
    StoredChunk {
        chunk_id: Uuid::new_v4().to_string(),
        content: doc.page_content.clone(),
        source: doc.metadata.source.clone(),
        page: doc.metadata.page,
        content_hash: content_hash(&doc.page_content),
    }
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_and_distinct() {
        assert_eq!(content_hash("same"), content_hash("same"));
        assert_ne!(content_hash("same"), content_hash("different"));
        assert_eq!(content_hash("same").len(), 64);
    }

    #[test]
    fn stored_chunk_carries_document_metadata() {
        let doc = Document::new("chunk text", "report.pdf").with_page(3);
        let chunk = stored_chunk(&doc);

        assert_eq!(chunk.content, "chunk text");
        assert_eq!(chunk.source, "report.pdf");
        assert_eq!(chunk.page, Some(3));
        assert_eq!(chunk.content_hash, content_hash("chunk text"));
        assert!(!chunk.chunk_id.is_empty());
    }
}
