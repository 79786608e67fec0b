//! Document admin routes: list, add and archive issuances.
//!
//! Changes here reach the chat index only after `/api/chat/reload-documents`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use tracing::error;

use crate::state::AppState;
use deped_core::Error;
use deped_ingest::Ingester;
use deped_store::{DocumentStatus, NewDocument, StoredDocument};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", get(list_documents).post(add_document))
        .route("/documents/{id}", delete(archive_document))
}

fn summary(doc: &StoredDocument) -> serde_json::Value {
    serde_json::json!({
        "id": doc.id,
        "title": doc.title,
        "documentType": doc.document_type,
        "tags": doc.tags,
        "status": doc.status,
        "charCount": doc.text.chars().count(),
        "createdAt": doc.created_at,
    })
}

/// GET /api/documents: active documents, newest first.
async fn list_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_documents(Some(DocumentStatus::Active)) {
        Ok(docs) => {
            let documents: Vec<serde_json::Value> = docs.iter().map(summary).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "documents": documents,
                    "total": documents.len(),
                })),
            )
        }
        Err(e) => {
            error!("Failed to list documents: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to fetch documents" })),
            )
        }
    }
}

/// POST /api/documents: ingest an already-extracted document.
async fn add_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewDocument>,
) -> impl IntoResponse {
    match Ingester::new(&state.store).ingest(req) {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Document added",
                "id": outcome.document_id,
                "metadata": outcome.metadata,
            })),
        ),
        Err(Error::Validation(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": msg })),
        ),
        Err(Error::DuplicateContent(hash)) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": "Duplicate content",
                "contentHash": hash,
            })),
        ),
        Err(e) => {
            error!("Failed to add document: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// DELETE /api/documents/{id}: archive; the row is kept.
async fn archive_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.archive_document(id) {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": id,
                "status": DocumentStatus::Archived,
            })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Document not found" })),
        ),
        Err(e) => {
            error!("Failed to archive document {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}
