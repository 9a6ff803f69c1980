use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// Drops the cached retriever and rebuilds the collection from the current
/// source documents. Concurrent queries wait for the rebuild to finish.
pub async fn rebuild_index(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let indexed_chunks = state.index.rebuild().await.map_err(ApiError::from)?;

    Ok(Json(json!({
        "status": "rebuilt",
        "collection": state.settings.index.collection,
        "indexed_chunks": indexed_chunks
    })))
}
