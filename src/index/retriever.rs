use std::sync::Arc;

use async_trait::async_trait;

use super::document::Document;
use super::store::VectorStore;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

/// Seam over the index read side so graph tests can run offline.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// The `top_k` most similar documents for the query, best first.
    async fn get_relevant(&self, query: &str) -> Result<Vec<Document>, ApiError>;
}

/// Read-side handle over a built collection: embeds the query and returns
/// the `top_k` most similar chunks as documents, best first.
#[derive(Clone)]
pub struct Retriever {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    embedding_model: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        collection: String,
        embedding_model: String,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            store,
            collection,
            embedding_model,
            top_k,
        }
    }

    pub async fn get_relevant(&self, query: &str) -> Result<Vec<Document>, ApiError> {
        let embeddings = self
            .provider
            .embed(&[query.to_string()], &self.embedding_model)
            .await?;
        let query_embedding = embeddings
            .first()
            .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;

        let results = self
            .store
            .search(&self.collection, query_embedding, self.top_k)
            .await?;

        Ok(results
            .into_iter()
            .map(|r| {
                let mut doc = Document::new(r.chunk.content, r.chunk.source);
                if let Some(page) = r.chunk.page {
                    doc = doc.with_page(page);
                }
                doc
            })
            .collect())
    }
}

#[async_trait]
impl DocumentSource for Retriever {
    async fn get_relevant(&self, query: &str) -> Result<Vec<Document>, ApiError> {
        Retriever::get_relevant(self, query).await
    }
}
