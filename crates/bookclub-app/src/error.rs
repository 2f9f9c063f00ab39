use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use tracing::error;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Multipart error: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] bookclub_dal::SqlxError),
}

impl From<bookclub_dal::Error> for ApiError {
    fn from(error: bookclub_dal::Error) -> Self {
        use bookclub_dal::Error as DalError;
        match error {
            DalError::RecordNotFound(what) => ApiError::NotFound(what),
            DalError::Validation(message) => ApiError::InvalidRequest(message),
            DalError::DuplicateRecord(message) => ApiError::Conflict(message),
            DalError::DatabaseError(e) => ApiError::DatabaseError(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) | ApiError::MultipartError(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
