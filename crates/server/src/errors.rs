use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body `{"error": ..., "detail": ...}` with an HTTP status.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Malformed { .. } | ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error = match &e {
            ServiceError::Validation(_) => "Validation Error",
            ServiceError::Conflict(_) => "Conflict",
            ServiceError::Malformed { .. } => "Malformed Article",
            ServiceError::Storage(_) => "Storage Error",
        };
        Self::new(status, error, Some(e.to_string()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, detail = ?self.detail, "request failed");
        } else {
            warn!(status = %self.status, error = %self.error, detail = ?self.detail, "request rejected");
        }
        (self.status, Json(serde_json::json!({"error": self.error, "detail": self.detail}))).into_response()
    }
}

/// Bare 404 for an unknown article filename.
pub fn article_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Article not found").into_response()
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::Malformed { filename: "a.md".into(), reason: "r".into() }, StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }
}
