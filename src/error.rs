use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum FountainError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("login failed: {0}")]
    LoginFailed(&'static str),

    #[error("missing bearer token")]
    Unauthenticated,

    #[error("invalid or expired token")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("object store error: {0}")]
    Storage(String),

    #[error("mail dispatch error: {0}")]
    Mail(String),

    #[error("chat upstream error: {0}")]
    Upstream(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FountainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl IntoResponse for FountainError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            FountainError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg,
                },
            ),
            // Login failures stay 400 for compatibility with the admin client.
            FountainError::LoginFailed(reason) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "LOGIN_FAILED".to_string(),
                    message: reason.to_string(),
                },
            ),
            FountainError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHENTICATED".to_string(),
                    message: "missing bearer token".to_string(),
                },
            ),
            FountainError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiErrorBody {
                    code: "FORBIDDEN".to_string(),
                    message: "invalid or expired token".to_string(),
                },
            ),
            FountainError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found"),
                },
            ),
            FountainError::Storage(msg) => {
                error!(error = %msg, "object store call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "STORAGE_ERROR".to_string(),
                        message: "image upload failed".to_string(),
                    },
                )
            }
            FountainError::Mail(msg) => {
                error!(error = %msg, "mail dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "MAIL_ERROR".to_string(),
                        message: "reply could not be delivered".to_string(),
                    },
                )
            }
            FountainError::Upstream(msg) => {
                error!(error = %msg, "chat upstream call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorBody {
                        code: "BAD_GATEWAY".to_string(),
                        message: "upstream service is unavailable".to_string(),
                    },
                )
            }
            FountainError::Reqwest(e) => {
                error!(error = %e, "outbound HTTP request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorBody {
                        code: "BAD_GATEWAY".to_string(),
                        message: "upstream service is unavailable".to_string(),
                    },
                )
            }
            FountainError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "an internal server error occurred".to_string(),
                    },
                )
            }
            FountainError::Json(e) => {
                error!(error = %e, "JSON (de)serialization error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "an internal server error occurred".to_string(),
                    },
                )
            }
            FountainError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "an internal server error occurred".to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
