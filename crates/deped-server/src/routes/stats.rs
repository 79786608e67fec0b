//! Stats route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/stats: store counts and the state of the in-memory index.
async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_stats = match state.store.get_stats() {
        Ok(stats) => stats,
        Err(e) => {
            error!("Failed to read store stats: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            );
        }
    };

    let snapshot = state.assistant.index().snapshot();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "documents": store_stats.total_documents,
            "activeDocuments": store_stats.active_documents,
            "documentsByType": store_stats.documents_by_type,
            "dbSizeMb": store_stats.db_size_mb,
            "index": {
                "loaded": snapshot.is_some(),
                "documents": snapshot.as_ref().map(|s| s.len()).unwrap_or(0),
                "generation": snapshot.as_ref().map(|s| s.generation()).unwrap_or(0),
                "loadedAt": snapshot.as_ref().map(|s| s.loaded_at().to_rfc3339()),
            },
            "search": state.assistant.settings(),
        })),
    )
}
