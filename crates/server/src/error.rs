use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::media::MediaError;
use crate::models::user::UserRole;

/// Postgres SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("missing or invalid session")]
    Unauthorized,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("media host error: {0}")]
    Media(#[from] MediaError),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("internal error")]
    Internal,
}

#[derive(Clone, Debug, Error)]
pub enum ValidationError {
    #[error("input value is invalid: `{value}`, reason: {reason}")]
    InvalidInput { value: String, reason: String },
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("limit exceeded for {subject}, allowed {limit} {unit}(s), got {attempted}")]
    LimitExceeded {
        subject: String,
        unit: String,
        attempted: usize,
        limit: usize,
    },
    #[error(
        "insufficient permissions for action, required role: {required}, current role: {current}"
    )]
    InsufficientPermissions {
        required: UserRole,
        current: UserRole,
    },
    #[error("requested object already exists")]
    AlreadyExists,
    #[error("requested object doesn't exist")]
    NotFound,
}

impl ValidationError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidInput { .. } | Self::MissingFields(_) | Self::LimitExceeded { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Sqlx(e) => match e {
                sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "not found".into()),
                sqlx::Error::Database(db)
                    if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) =>
                {
                    debug!("unique violation: {db}");
                    (
                        StatusCode::CONFLICT,
                        ValidationError::AlreadyExists.to_string(),
                    )
                }
                e => {
                    error!("received internal error for user request: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Something went wrong".into(),
                    )
                }
            },
            Self::Media(e) => {
                error!("media host request failed: {e}");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            Self::Validation(e) => (e.status(), e.to_string()),
            e @ Self::Unauthorized => (StatusCode::UNAUTHORIZED, e.to_string()),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".into(),
            ),
        };
        let error = json!({ "error": error }).to_string();
        (status, error).into_response()
    }
}

#[derive(Clone, Debug)]
pub enum SessionError {
    BadToken,
    TokenNotFound,
    TokenExpired,
    Internal,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadToken => (StatusCode::UNAUTHORIZED, "Missing or bad token in request"),
            Self::TokenNotFound => (StatusCode::UNAUTHORIZED, "Token cannot be found"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong"),
        };
        let error = json!({ "error": error }).to_string();
        (status, error).into_response()
    }
}

impl From<SessionError> for RequestError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::Internal => Self::Internal,
            _ => Self::Unauthorized,
        }
    }
}
