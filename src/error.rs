use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error kinds returned as values through every layer and converted to a
/// `{"error": "..."}` body at the request boundary.
///
/// `NotFound` maps to 400: the message and assembly paths surface missing
/// users and groups as bad requests. The direct user-lookup endpoint instead
/// answers 404 through `UserNotFound`; the two mappings differ per endpoint
/// and are not unified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(String),
    Authorization(String),
    NotFound(String),
    UserNotFound(String),
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Authorization(_) | ApiError::NotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::Authorization(m)
            | ApiError::NotFound(m)
            | ApiError::UserNotFound(m)
            | ApiError::Storage(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {}", self.message());
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Engine failures are recognized by the `SQLITE_ERROR` marker in the error
/// text; anything else from the driver falls through as a 400 on the paths
/// that use `?`.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        let text = err.to_string();
        if text.contains("SQLITE_ERROR") {
            ApiError::Storage(text)
        } else {
            ApiError::Validation(text)
        }
    }
}
