// src/api.rs
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::feed::Transaction;

#[derive(Clone)]
pub struct AppState {
    pub cards_dir: PathBuf,
    pub latest_path: PathBuf,
    pub last_new: Arc<RwLock<Vec<Transaction>>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/last", get(last_new))
        .route("/cards/latest.png", get(latest_card))
        .route("/cards/{name}", get(card_by_name))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Most recent batch of newly seen transactions (empty until the first
/// delivering cycle finds something).
async fn last_new(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    let rows = state
        .last_new
        .read()
        .expect("last_new rwlock poisoned")
        .clone();
    Json(rows)
}

/// Content-addressed card lookup: `/cards/{id}.png`. Ids are hex, so
/// anything else (including traversal attempts) is a plain 404.
async fn card_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let Some(id) = name.strip_suffix(".png") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    serve_png(state.cards_dir.join(format!("{id}.png"))).await
}

/// Best-effort alias of the most recently rendered card.
async fn latest_card(State(state): State<AppState>) -> impl IntoResponse {
    serve_png(state.latest_path.clone()).await
}

async fn serve_png(path: PathBuf) -> axum::response::Response {
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
