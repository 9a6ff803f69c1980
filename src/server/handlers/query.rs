use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::graph::{GraphState, WebSearchFlag};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// The question the answer was generated from; differs from the input
    /// when the pipeline rewrote it for web search.
    pub question: String,
    pub answer: String,
    pub web_search: WebSearchFlag,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SourceRef {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

pub async fn post_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let mut graph_state = GraphState::new(question);
    state
        .graph_runtime
        .run(&mut graph_state, &state.graph_context)
        .await?;

    let answer = graph_state
        .generation
        .ok_or_else(|| ApiError::Internal("graph finished without an answer".to_string()))?;

    let mut sources: Vec<SourceRef> = graph_state
        .documents
        .iter()
        .map(|d| SourceRef {
            source: d.metadata.source.clone(),
            page: d.metadata.page,
        })
        .collect();
    sources.dedup();

    Ok(Json(QueryResponse {
        question: graph_state.question,
        answer,
        web_search: graph_state.web_search,
        sources,
    }))
}
