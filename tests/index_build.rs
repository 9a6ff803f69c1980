// Index build and retrieval over the real SQLite store, with PDF sources
// generated into a temp directory and a deterministic embedder standing in
// for the provider.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};

use corrag::core::config::IndexSettings;
use corrag::core::errors::ApiError;
use corrag::index::{pdf, DocumentSource, IndexHandle, Indexer, SqliteVectorStore};
use corrag::llm::{ChatRequest, LlmProvider};

/// Embeds text as a byte histogram, so similar strings land close together
/// and every call is reproducible.
#[derive(Default)]
struct HistogramEmbedder {
    embed_calls: AtomicUsize,
}

impl HistogramEmbedder {
    fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for HistogramEmbedder {
    fn name(&self) -> &str {
        "fake-embed"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        Err(ApiError::Internal(
            "chat is not used by the indexer".to_string(),
        ))
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; 16];
                for b in text.bytes() {
                    v[(b % 16) as usize] += 1.0;
                }
                v
            })
            .collect())
    }
}

/// One-page PDF with `text` drawn in a standard font, written to `path`.
fn write_sample_pdf(path: &Path, text: &str) {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().unwrap(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(path).unwrap();
}

fn test_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("corrag-index-test-{}.db", uuid::Uuid::new_v4()))
}

async fn test_indexer(provider: Arc<HistogramEmbedder>, documents_dir: &Path) -> Indexer {
    let store = SqliteVectorStore::new(test_db_path()).await.unwrap();
    Indexer::new(
        provider,
        Arc::new(store),
        IndexSettings::default(),
        "fake-embedding".to_string(),
        documents_dir.to_path_buf(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[test]
fn extracted_text_round_trips_pdf_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    write_sample_pdf(&path, "Quarterly revenue grew twelve percent");

    let text = pdf::extract_text(&path).unwrap();
    assert!(text.contains("Quarterly revenue"));
    assert!(text.contains("twelve percent"));
}

#[tokio::test]
async fn built_index_retrieves_matching_chunks() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_pdf(
        &dir.path().join("agents.pdf"),
        "Agents decompose goals into smaller subtasks",
    );

    let indexer = test_indexer(Arc::new(HistogramEmbedder::default()), dir.path()).await;
    let retriever = indexer.build_index().await.unwrap();

    let results = retriever
        .get_relevant("how do agents decompose goals?")
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results[0].page_content.contains("decompose goals"));
    assert_eq!(results[0].metadata.source, "agents.pdf");
    assert_eq!(results[0].metadata.page, Some(1));
}

#[tokio::test]
async fn rebuilding_clears_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let first_pdf = dir.path().join("first.pdf");
    write_sample_pdf(&first_pdf, "Original notes about embeddings");

    let indexer = test_indexer(Arc::new(HistogramEmbedder::default()), dir.path()).await;
    indexer.build_index().await.unwrap();
    assert!(indexer.chunk_count().await.unwrap() > 0);

    std::fs::remove_file(&first_pdf).unwrap();
    write_sample_pdf(
        &dir.path().join("second.pdf"),
        "Replacement notes about retrieval",
    );
    let retriever = indexer.build_index().await.unwrap();

    let results = retriever.get_relevant("notes about embeddings").await.unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|d| d.metadata.source == "second.pdf"));
}

#[tokio::test]
async fn index_handle_builds_once_until_invalidated() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_pdf(
        &dir.path().join("agents.pdf"),
        "Agents decompose goals into smaller subtasks",
    );

    let provider = Arc::new(HistogramEmbedder::default());
    let handle = IndexHandle::new(test_indexer(provider.clone(), dir.path()).await);

    // First request builds (one chunk batch) and embeds the query.
    handle.get_relevant("goals").await.unwrap();
    let after_first = provider.embed_calls();
    assert_eq!(after_first, 2);

    // Cached retriever: only the query embedding.
    handle.get_relevant("goals").await.unwrap();
    assert_eq!(provider.embed_calls(), after_first + 1);

    // Invalidation forces a rebuild on the next request.
    handle.invalidate().await;
    handle.get_relevant("goals").await.unwrap();
    assert_eq!(provider.embed_calls(), after_first + 3);
}
