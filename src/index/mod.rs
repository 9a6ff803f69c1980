pub mod document;
pub mod indexer;
pub mod loader;
pub mod pdf;
pub mod retriever;
pub mod splitter;
pub mod sqlite;
pub mod store;
pub mod vector_math;

use thiserror::Error;

use crate::core::errors::ApiError;

pub use document::{Document, DocumentMetadata};
pub use indexer::{IndexHandle, Indexer};
pub use retriever::{DocumentSource, Retriever};
pub use splitter::TextSplitter;
pub use sqlite::SqliteVectorStore;
pub use store::{ChunkSearchResult, StoredChunk, VectorStore};

/// Failures while building the index. Source problems are fatal for the
/// build; individual unreadable documents are skipped before these fire.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("source not found: {0}")]
    SourceNotFound(String),
    #[error("no documents were successfully loaded")]
    NoDocumentsLoaded,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::SourceNotFound(msg) => ApiError::NotFound(msg),
            IndexError::NoDocumentsLoaded => {
                ApiError::BadRequest("no documents were successfully loaded".to_string())
            }
            IndexError::Api(inner) => inner,
        }
    }
}
