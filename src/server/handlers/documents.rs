use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fs;

use crate::core::errors::ApiError;
use crate::index::pdf;
use crate::state::AppState;

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut documents = Vec::new();

    if let Ok(entries) = fs::read_dir(&state.documents_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                let metadata = entry.metadata().ok();
                let size_bytes = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
                let modified = metadata
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Utc>::from);
                documents.push((name.to_string(), size_bytes, modified));
            }
        }
    }

    documents.sort_by(|a, b| a.0.cmp(&b.0));

    let result: Vec<Value> = documents
        .into_iter()
        .map(|(name, size_bytes, modified)| {
            json!({
                "name": name,
                "size_bytes": size_bytes,
                "modified": modified
            })
        })
        .collect();

    Ok(Json(json!({"documents": result})))
}

pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut saved = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart payload: {}", e)))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let safe_name = sanitize_document_filename(&original_name)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid filename: {}", original_name)))?
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "uploaded file is empty: {}",
                safe_name
            )));
        }

        let target = state.documents_dir.join(&safe_name);
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(ApiError::internal)?;

        tracing::info!(filename = %safe_name, size = bytes.len(), "document uploaded");
        saved.push(json!({"name": safe_name, "size_bytes": bytes.len()}));
    }

    if saved.is_empty() {
        return Err(ApiError::BadRequest(
            "no file field found in upload".to_string(),
        ));
    }

    // The source set changed; the next query rebuilds the index.
    state.index.invalidate().await;

    Ok(Json(json!({"status": "uploaded", "documents": saved})))
}

pub async fn get_document_text(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let safe_name = sanitize_document_filename(&filename)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid filename: {}", filename)))?;
    let path = state.documents_dir.join(safe_name);

    if !path.exists() {
        return Err(ApiError::NotFound(format!(
            "document not found: {}",
            safe_name
        )));
    }

    let text = tokio::task::spawn_blocking(move || pdf::extract_text(&path))
        .await
        .map_err(ApiError::internal)??;

    Ok(Json(json!({"name": filename, "text": text})))
}

/// Only a plain `.pdf` base name is allowed; separators, parent references
/// and absolute paths are rejected.
fn sanitize_document_filename(filename: &str) -> Option<&str> {
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())?;
    if base != filename || filename.contains("..") || filename.contains('\\') {
        return None;
    }
    let is_pdf = std::path::Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Some(base)
    } else {
        None
    }
}
