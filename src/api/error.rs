//! HTTP error mapping.
//!
//! Handlers return `Result<_, ApiError>`; domain failures convert with `?`
//! and are rendered as `{ "error": ... }` JSON bodies.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Admin role required")]
    Forbidden,

    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// Request the extractors could not decode
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

/// JSON body extractor that hands decode failures to the handler.
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Domain(DomainError::Validation(violations)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "Validation failed",
                    "description": self.to_string(),
                    "violations": violations,
                }),
            ),
            ApiError::Domain(DomainError::NotFound) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::Domain(DomainError::External(_)) | ApiError::BadGateway(_) => {
                tracing::error!("{}", self);
                (StatusCode::BAD_GATEWAY, json!({ "error": self.to_string() }))
            }
            ApiError::Domain(DomainError::Unavailable(_)) => {
                tracing::error!("{}", self);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": self.to_string() }),
                )
            }
            ApiError::Domain(DomainError::Database(_) | DomainError::Internal(_)) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() })),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": self.to_string() })),
            ApiError::Rejected { status, message } => {
                tracing::warn!("Rejected request: {}", message);
                (*status, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}
