//! Service error taxonomy.
//!
//! Every repository and handler failure is one of a small set of kinds so
//! callers (and tests) can tell "not found" from "forbidden" from "the
//! database is down". Ownership violations map to the same status code as
//! not-found so the API never confirms the existence of someone else's
//! private data.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("authentication required")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflicting write")]
    Conflict,

    #[error("storage error")]
    Storage(#[from] mongodb::error::Error),

    #[error("invalid identifier")]
    InvalidId(#[from] mongodb::bson::oid::Error),

    #[error("encoding error")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("internal error")]
    Internal,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Forbidden deliberately renders as not-found: a caller probing
            // someone else's recipe or collection learns nothing.
            ServiceError::NotFound | ServiceError::Forbidden | ServiceError::InvalidId(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Conflict => StatusCode::CONFLICT,
            ServiceError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Encode(_) | ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound | ServiceError::Forbidden | ServiceError::InvalidId(_) => {
                "not_found"
            }
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Validation(_) => "validation_failed",
            ServiceError::Conflict => "conflict",
            ServiceError::Storage(_) => "storage_unavailable",
            ServiceError::Encode(_) | ServiceError::Internal => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::Storage(e) => tracing::error!("storage error: {}", e),
            ServiceError::Encode(e) => tracing::error!("bson encoding error: {}", e),
            ServiceError::Conflict => tracing::warn!("write conflict gave up after retries"),
            _ => {}
        }

        let message = match &self {
            // Storage details stay in the logs.
            ServiceError::Storage(_) => "storage unavailable".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_forbidden_share_status() {
        assert_eq!(ServiceError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Forbidden.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::Unauthorized.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Validation("title required".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ServiceError::Conflict.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_message_carries_detail() {
        let err = ServiceError::Validation("rating must be between 1 and 5".into());
        assert!(err.to_string().contains("between 1 and 5"));
    }
}
