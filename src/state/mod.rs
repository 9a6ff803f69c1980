use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{AppPaths, ConfigService, SearchSettings, Settings};
use crate::core::secrets::resolve_api_key;
use crate::graph::{build_rag_graph, GraphContext, GraphRuntime};
use crate::index::{DocumentSource, IndexHandle, Indexer, SqliteVectorStore, VectorStore};
use crate::llm::{AnswerGenerator, DocumentGrader, LlmProvider, OpenAiProvider, QuestionRewriter};
use crate::tools::WebSearch;

pub mod error;

use error::InitializationError;

/// Global application state shared across all routes.
///
/// Contains references to:
/// - Configuration and paths
/// - The LLM provider and vector store
/// - The document index (built lazily, cached until invalidated)
/// - Graph runtime and the component context its nodes execute against
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<Settings>,
    pub llm: Arc<dyn LlmProvider>,
    pub documents_dir: PathBuf,
    pub index: Arc<IndexHandle>,
    pub graph_runtime: Arc<GraphRuntime>,
    pub graph_context: Arc<GraphContext>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Setting up paths and loading configuration
    /// 2. Resolving API keys (config, then environment, then prompt)
    /// 3. Opening the vector store and wiring the indexer behind its handle
    /// 4. Building the pipeline components and the execution graph
    ///
    /// The index itself is not built here; the first query or an explicit
    /// rebuild triggers that.
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());

        let raw_config = config
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;
        let settings = Arc::new(
            Settings::from_value(&raw_config).map_err(|e| InitializationError::Config(e.into()))?,
        );

        // A key is mandatory only for the hosted OpenAI endpoint;
        // self-hosted compatible servers usually run without one.
        let require_llm_key = settings.llm.base_url.contains("api.openai.com");
        let llm_api_key = resolve_api_key(
            settings.llm.api_key.as_deref(),
            "OPENAI_API_KEY",
            require_llm_key,
        )
        .map_err(|e| InitializationError::Llm(e.into()))?;

        let llm: Arc<dyn LlmProvider> = Arc::new(
            OpenAiProvider::new(&settings.llm, llm_api_key)
                .map_err(|e| InitializationError::Llm(e.into()))?,
        );

        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::new(paths.db_path.clone())
                .await
                .map_err(|e| InitializationError::VectorStore(e.into()))?,
        );

        let documents_dir = resolve_documents_dir(&paths, &settings);
        std::fs::create_dir_all(&documents_dir)
            .map_err(|e| InitializationError::Index(e.into()))?;

        let request_timeout = Duration::from_secs(settings.llm.request_timeout_secs);
        let indexer = Indexer::new(
            llm.clone(),
            store,
            settings.index.clone(),
            settings.llm.embedding_model.clone(),
            documents_dir.clone(),
            request_timeout,
        )
        .map_err(|e| InitializationError::Index(e.into()))?;
        let index = Arc::new(IndexHandle::new(indexer));

        let search_settings = resolve_search_keys(&settings)?;
        let search = WebSearch::new(search_settings, request_timeout)
            .map_err(|e| InitializationError::Search(e.into()))?;

        let graph_context = Arc::new(GraphContext {
            retriever: index.clone() as Arc<dyn DocumentSource>,
            grader: Arc::new(DocumentGrader::new(llm.clone(), &settings.llm)),
            rewriter: Arc::new(QuestionRewriter::new(llm.clone(), &settings.llm)),
            generator: Arc::new(AnswerGenerator::new(llm.clone(), &settings.llm)),
            search: Arc::new(search),
        });

        let graph_runtime =
            Arc::new(build_rag_graph().map_err(|e| InitializationError::Graph(e.into()))?);

        Ok(Arc::new(AppState {
            paths,
            config,
            settings,
            llm,
            documents_dir,
            index,
            graph_runtime,
            graph_context,
        }))
    }
}

/// Uploads directory: the configured override when present (relative paths
/// resolve against the user data dir), the default documents dir otherwise.
fn resolve_documents_dir(paths: &AppPaths, settings: &Settings) -> PathBuf {
    match settings.index.data_dir.as_deref() {
        Some(dir) => {
            let candidate = PathBuf::from(dir);
            if candidate.is_absolute() {
                candidate
            } else {
                paths.user_data_dir.join(candidate)
            }
        }
        None => paths.documents_dir.clone(),
    }
}

/// Fills in provider keys from the environment (or a prompt) when the
/// config left them out. Keys stay optional: providers without one fall
/// back to keyless search.
fn resolve_search_keys(settings: &Settings) -> Result<SearchSettings, InitializationError> {
    let mut search = settings.search.clone();
    search.tavily_api_key =
        resolve_api_key(search.tavily_api_key.as_deref(), "TAVILY_API_KEY", false)
            .map_err(|e| InitializationError::Search(e.into()))?;
    search.brave_api_key =
        resolve_api_key(search.brave_api_key.as_deref(), "BRAVE_SEARCH_API_KEY", false)
            .map_err(|e| InitializationError::Search(e.into()))?;
    Ok(search)
}
