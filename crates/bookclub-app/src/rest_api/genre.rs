use axum::{response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;

use bookclub_dal::genre::GenreRepository;

use crate::{error::ApiResult, state::AppState};

crate::repository_from_request!(GenreRepository);

pub async fn list(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let genres = repository.list().await?;
    Ok((StatusCode::OK, Json(genres)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
