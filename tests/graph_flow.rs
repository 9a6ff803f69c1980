// End-to-end graph execution against offline fakes.
//
// The fake LLM answers each component by inspecting the request: grading
// calls carry a response_format, rewriter calls a distinctive system
// prompt, and everything else is treated as generation (which echoes the
// user message so assertions can see the assembled context).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use corrag::core::config::LlmSettings;
use corrag::core::errors::ApiError;
use corrag::graph::{build_rag_graph, GraphContext, GraphState, WebSearchFlag};
use corrag::index::{Document, DocumentSource};
use corrag::llm::{AnswerGenerator, ChatRequest, DocumentGrader, LlmProvider, QuestionRewriter};
use corrag::tools::{SearchProvider, SearchResult};

const OFF_TOPIC_MARKER: &str = "completely unrelated trivia";

struct FakeLlm {
    rewrite_to: String,
}

impl FakeLlm {
    fn new(rewrite_to: &str) -> Self {
        Self {
            rewrite_to: rewrite_to.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        let system = request
            .messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let user = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if request.response_format.is_some() {
            let score = if user.contains(OFF_TOPIC_MARKER) {
                "no"
            } else {
                "yes"
            };
            return Ok(format!("{{\"binary_score\": \"{}\"}}", score));
        }

        if system.contains("re-writer") {
            return Ok(self.rewrite_to.clone());
        }

        // Generation: echo the prompt so tests can inspect the context.
        Ok(user)
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(vec![vec![0.0; 4]; inputs.len()])
    }
}

struct FakeRetriever {
    documents: Vec<Document>,
}

#[async_trait]
impl DocumentSource for FakeRetriever {
    async fn get_relevant(&self, _query: &str) -> Result<Vec<Document>, ApiError> {
        Ok(self.documents.clone())
    }
}

#[derive(Default)]
struct FakeSearch {
    results: Vec<SearchResult>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    fn with_results(snippets: &[&str]) -> Self {
        Self {
            results: snippets
                .iter()
                .enumerate()
                .map(|(i, snippet)| SearchResult {
                    title: format!("result {}", i),
                    url: format!("https://example.com/{}", i),
                    content: snippet.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.clone())
    }
}

fn context_with(
    documents: Vec<Document>,
    rewrite_to: &str,
    search: Arc<FakeSearch>,
) -> GraphContext {
    let llm: Arc<dyn LlmProvider> = Arc::new(FakeLlm::new(rewrite_to));
    let settings = LlmSettings::default();

    GraphContext {
        retriever: Arc::new(FakeRetriever { documents }),
        grader: Arc::new(DocumentGrader::new(llm.clone(), &settings)),
        rewriter: Arc::new(QuestionRewriter::new(llm.clone(), &settings)),
        generator: Arc::new(AnswerGenerator::new(llm, &settings)),
        search,
    }
}

fn doc(content: &str) -> Document {
    Document::new(content, "notes.pdf")
}

#[tokio::test]
async fn all_relevant_documents_skip_web_search() {
    let search = Arc::new(FakeSearch::with_results(&["web snippet"]));
    let ctx = context_with(
        vec![doc("agents use episodic memory"), doc("agents plan subgoals")],
        "rewritten question",
        search.clone(),
    );
    let graph = build_rag_graph().unwrap();

    let mut state = GraphState::new("how do agents remember?");
    graph.run(&mut state, &ctx).await.unwrap();

    assert_eq!(state.web_search, WebSearchFlag::No);
    assert_eq!(state.question, "how do agents remember?");
    assert!(state.generation.is_some());
    assert_eq!(search.call_count(), 0);

    // Grading kept every document in retrieval order.
    assert_eq!(state.documents.len(), 2);
    assert_eq!(state.documents[0].page_content, "agents use episodic memory");
    assert_eq!(state.documents[1].page_content, "agents plan subgoals");
}

#[tokio::test]
async fn one_irrelevant_document_routes_through_web_search() {
    let search = Arc::new(FakeSearch::with_results(&["snippet one", "snippet two"]));
    // The irrelevant document comes first, so a last-grade-wins aggregation
    // would miss it.
    let ctx = context_with(
        vec![
            doc(OFF_TOPIC_MARKER),
            doc("agents use episodic memory"),
        ],
        "improved agent memory question",
        search.clone(),
    );
    let graph = build_rag_graph().unwrap();

    let mut state = GraphState::new("how do agents remember?");
    graph.run(&mut state, &ctx).await.unwrap();

    assert_eq!(state.web_search, WebSearchFlag::Yes);
    assert_eq!(state.question, "improved agent memory question");
    assert_eq!(search.call_count(), 1);
    assert_eq!(search.last_query().as_deref(), Some("improved agent memory question"));

    // One graded document kept, exactly one synthetic document appended
    // after it.
    assert_eq!(state.documents.len(), 2);
    assert_eq!(state.documents[0].page_content, "agents use episodic memory");
    assert_eq!(state.documents[1].metadata.source, "web_search");
    assert_eq!(state.documents[1].page_content, "snippet one\nsnippet two");

    // Generation saw both the kept chunk and the merged web document.
    let answer = state.generation.unwrap();
    assert!(answer.contains("agents use episodic memory"));
    assert!(answer.contains("snippet one\nsnippet two"));
}

#[tokio::test]
async fn irrelevant_last_document_still_triggers_web_search() {
    let search = Arc::new(FakeSearch::with_results(&["snippet"]));
    let ctx = context_with(
        vec![
            doc("agents use episodic memory"),
            doc("agents plan subgoals"),
            doc(OFF_TOPIC_MARKER),
        ],
        "improved question",
        search.clone(),
    );
    let graph = build_rag_graph().unwrap();

    let mut state = GraphState::new("how do agents remember?");
    graph.run(&mut state, &ctx).await.unwrap();

    assert_eq!(state.web_search, WebSearchFlag::Yes);
    assert_eq!(search.call_count(), 1);

    // The two relevant documents survive in order, web result appended last.
    assert_eq!(state.documents.len(), 3);
    assert_eq!(state.documents[0].page_content, "agents use episodic memory");
    assert_eq!(state.documents[1].page_content, "agents plan subgoals");
    assert_eq!(state.documents[2].metadata.source, "web_search");
}

#[tokio::test]
async fn empty_retrieval_generates_without_context() {
    let search = Arc::new(FakeSearch::with_results(&["snippet"]));
    let ctx = context_with(Vec::new(), "unused rewrite", search.clone());
    let graph = build_rag_graph().unwrap();

    let mut state = GraphState::new("a question about nothing indexed");
    graph.run(&mut state, &ctx).await.unwrap();

    // Nothing to grade means nothing was irrelevant.
    assert_eq!(state.web_search, WebSearchFlag::No);
    assert!(state.documents.is_empty());
    assert!(state.generation.is_some());
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn blank_rewrite_keeps_the_original_question() {
    let search = Arc::new(FakeSearch::with_results(&["snippet"]));
    let ctx = context_with(vec![doc(OFF_TOPIC_MARKER)], "   ", search.clone());
    let graph = build_rag_graph().unwrap();

    let mut state = GraphState::new("how do agents remember?");
    graph.run(&mut state, &ctx).await.unwrap();

    assert_eq!(state.question, "how do agents remember?");
    assert_eq!(search.last_query().as_deref(), Some("how do agents remember?"));
}

#[tokio::test]
async fn web_search_without_results_appends_nothing() {
    let search = Arc::new(FakeSearch::with_results(&[]));
    let ctx = context_with(
        vec![doc("agents use episodic memory"), doc(OFF_TOPIC_MARKER)],
        "improved question",
        search.clone(),
    );
    let graph = build_rag_graph().unwrap();

    let mut state = GraphState::new("how do agents remember?");
    graph.run(&mut state, &ctx).await.unwrap();

    assert_eq!(state.web_search, WebSearchFlag::Yes);
    assert_eq!(search.call_count(), 1);
    assert_eq!(state.documents.len(), 1);
    assert!(state.documents.iter().all(|d| d.metadata.source != "web_search"));
    assert!(state.generation.is_some());
}
