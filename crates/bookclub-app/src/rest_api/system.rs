use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use http::StatusCode;
use serde_json::json;
use tracing::info;

use bookclub_dal::book::BookRepository;

use crate::{error::ApiResult, state::AppState};

pub async fn health(repository: BookRepository) -> ApiResult<impl IntoResponse> {
    let books = repository.count().await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "database": "connected",
            "books": books,
            "isEmpty": books == 0,
        })),
    ))
}

/// Forced re-seed from the books directory. Returns the outcome as data,
/// even when the seed itself failed.
pub async fn reinitialize(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("Reinitializing database from seed directory");
    let outcome = state.seed_loader().initialize(true).await;
    Ok((StatusCode::OK, Json(outcome)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/reinitialize", post(reinitialize))
}
