use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use http::StatusCode;
use serde::Deserialize;
use tracing::debug;

use bookclub_dal::book::{BookRepository, CreateBook, MAX_COVER_BYTES};

use crate::{
    error::{ApiError, ApiResult},
    rest_api::flag,
    state::AppState,
};

crate::repository_from_request!(BookRepository);

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    search: Option<String>,
    optimized: Option<String>,
    is_bookclub: Option<String>,
}

pub async fn list(
    repository: BookRepository,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let books = if flag(query.optimized.as_deref()) {
        repository
            .list_optimized(flag(query.is_bookclub.as_deref()))
            .await?
    } else if let Some(search) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        repository.search(search).await?
    } else {
        repository.list_all().await?
    };
    Ok((StatusCode::OK, Json(books)))
}

pub async fn get_one(
    Path(id): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let book = repository.get(&id).await?;
    Ok((StatusCode::OK, Json(book)))
}

pub async fn create(
    repository: BookRepository,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut payload = CreateBook::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => payload.title = field.text().await?,
            "description" => payload.description = Some(field.text().await?),
            "genres" => {
                let raw = field.text().await?;
                payload.genres = serde_json::from_str(&raw)
                    .map_err(|_| ApiError::InvalidRequest("Invalid genres format".into()))?;
            }
            "is_bookclub" => {
                let raw = field.text().await?;
                payload.is_bookclub = flag(Some(raw.as_str()));
            }
            "writer" => payload.writer = Some(field.text().await?),
            "author" => payload.author = Some(field.text().await?),
            "rating" => {
                let raw = field.text().await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let rating = raw
                        .parse()
                        .map_err(|_| ApiError::InvalidRequest("Invalid rating value".into()))?;
                    payload.rating = Some(rating);
                }
            }
            "cover" => {
                if !field
                    .content_type()
                    .is_some_and(|t| t.starts_with("image/"))
                {
                    return Err(ApiError::InvalidRequest(
                        "Only image files are allowed".into(),
                    ));
                }
                let data = field.bytes().await?;
                if data.len() > MAX_COVER_BYTES {
                    return Err(ApiError::InvalidRequest(
                        "Cover image exceeds the 5MB limit".into(),
                    ));
                }
                payload.cover = Some(data.to_vec());
            }
            other => debug!("Ignoring unknown form field {other}"),
        }
    }

    let book = repository.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn delete_one(
    Path(id): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    if repository.delete(&id).await? {
        Ok((StatusCode::NO_CONTENT, ()))
    } else {
        Err(ApiError::NotFound(format!("Book {id}")))
    }
}

pub fn router(upload_limit_mb: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).delete(delete_one))
        .layer(DefaultBodyLimit::max(1024 * 1024 * upload_limit_mb))
}
