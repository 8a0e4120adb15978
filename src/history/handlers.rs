//! CRUD endpoints over the server-side request log.
//!
//! When storage is disabled reads degrade to empty results; writes
//! report the store as unavailable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::http::server::AppState;

pub fn setup_history_router() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/api/history/{id}", get(get_entry).delete(delete_entry))
}

pub async fn list_history(State(state): State<AppState>) -> Response {
    match &state.history {
        Some(store) => Json(store.list()).into_response(),
        None => Json(Vec::<serde_json::Value>::new()).into_response(),
    }
}

pub async fn get_entry(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.history.as_ref().and_then(|store| store.get(&id)) {
        Some(log) => Json(log).into_response(),
        None => not_found(),
    }
}

pub async fn delete_entry(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(store) = &state.history else {
        return unavailable();
    };
    match store.remove(&id) {
        Ok(_) => Json(json!({ "message": "Request deleted" })).into_response(),
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "Failed to persist history deletion");
            internal_error(e.to_string())
        }
    }
}

pub async fn clear_history(State(state): State<AppState>) -> Response {
    let Some(store) = &state.history else {
        return unavailable();
    };
    match store.clear() {
        Ok(()) => Json(json!({ "message": "History cleared" })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to persist history clear");
            internal_error(e.to_string())
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Request not found" })),
    )
        .into_response()
}

fn unavailable() -> Response {
    internal_error("History storage is unavailable".to_string())
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
