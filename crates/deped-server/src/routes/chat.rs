//! Chat routes: question answering over the document index.
//! Matches /api/chat/* endpoints used by the chat UI.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/query", post(query))
        .route("/chat/suggestions", get(suggestions))
        .route("/chat/history", get(history))
        .route("/chat/reload-documents", post(reload_documents))
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// POST /api/chat/query: answer a question.
async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<serde_json::Value>,
) -> impl IntoResponse {
    let question = match req.get("query").and_then(|q| q.as_str()) {
        Some(q) if !q.is_empty() => q,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Please provide a question!",
                })),
            );
        }
    };

    let response = state.assistant.answer(question);
    info!("Query {:?} answered as {}", question, response.kind());

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "response": response,
            "timestamp": timestamp(),
        })),
    )
}

/// GET /api/chat/suggestions: static example questions.
async fn suggestions(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "suggestions": state.assistant.suggestions(),
        "timestamp": timestamp(),
    }))
}

/// GET /api/chat/history: no conversation memory is kept.
async fn history() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "history": [],
        "message": "Chat history is not stored.",
    }))
}

/// POST /api/chat/reload-documents: rebuild the index from the store.
async fn reload_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reload_state = state.clone();
    let result = tokio::task::spawn_blocking(move || reload_state.assistant.try_reload()).await;

    match result {
        Ok(Ok(count)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Documents reloaded successfully",
                "documents": count,
            })),
        ),
        Ok(Err(e)) => {
            error!("Document reload failed, keeping previous index: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Failed to reload documents",
                })),
            )
        }
        Err(e) => {
            error!("Reload task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Failed to reload documents",
                })),
            )
        }
    }
}
