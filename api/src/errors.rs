use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::content::ContentError;

/// Whether 500 responses carry the underlying message.
/// Set once at startup from `APP_ENV`.
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Token is missing")]
    TokenMissing,

    #[error("Token is invalid or expired")]
    TokenInvalid,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InternalError(String),
}

impl ApiError {
    pub fn admin_required() -> Self {
        ApiError::Forbidden("Admin permission required".into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::TokenMissing | ApiError::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExists | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::NotFound(slug) => ApiError::NotFound(format!("Post '{slug}'")),
            ContentError::InvalidSlug(slug) => {
                ApiError::ValidationError(format!("Invalid post identifier '{slug}'"))
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("Background task failed: {e}"))
    }
}

/// Convert our custom errors to HTTP responses
///
/// Every error body has the shape `{"error": "<message>"}`. Internal
/// failures are always logged; their detail only reaches the client in
/// development mode.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {}", self);
            if EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed) {
                self.to_string()
            } else {
                "Internal server error".to_string()
            }
        } else {
            self.to_string()
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(ApiError::TokenMissing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::admin_required().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("Post".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::ValidationError("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InternalError("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn content_not_found_becomes_404() {
        let err: ApiError = ContentError::NotFound("missing".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Post 'missing' not found");
    }
}
