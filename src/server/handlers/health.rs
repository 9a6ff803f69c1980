use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let indexed_chunks = state.index.chunk_count().await.unwrap_or(0);

    Ok(Json(json!({
        "status": "ok",
        "provider": state.llm.name(),
        "collection": state.settings.index.collection,
        "indexed_chunks": indexed_chunks
    })))
}
