use axum::{extract::Path, response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;

use bookclub_dal::comment::{CommentRepository, CreateComment};

use crate::{error::ApiResult, state::AppState};

crate::repository_from_request!(CommentRepository);

pub async fn list(
    Path(id): Path<String>,
    repository: CommentRepository,
) -> ApiResult<impl IntoResponse> {
    let comments = repository.list(&id).await?;
    Ok((StatusCode::OK, Json(comments)))
}

pub async fn create(
    Path(id): Path<String>,
    repository: CommentRepository,
    Json(payload): Json<CreateComment>,
) -> ApiResult<impl IntoResponse> {
    let comment = repository.create(&id, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/comments", get(list).post(create))
}
