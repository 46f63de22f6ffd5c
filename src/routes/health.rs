use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "wordcard-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "words": state.vocabulary.len(),
        "storage": state.store.kind(),
        "sessions": state.sessions.len()
    }))
}
