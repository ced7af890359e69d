//! Structured errors for the origin server.
//!
//! Every error renders as a JSON body `{"error": "..."}`. Internal details are
//! logged, never sent to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No route or file matched.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// A handler failed.
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ServerError::NotFound(_) => "not found",
            ServerError::Internal(_) => "internal server error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ServerError::Internal(detail) => tracing::error!(error = %detail, "request failed"),
            ServerError::NotFound(path) => tracing::debug!(%path, "not found"),
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ServerError::NotFound("/nope".into()).to_string(), "NOT_FOUND: /nope");
        assert_eq!(ServerError::Internal("disk".into()).to_string(), "INTERNAL: disk");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ServerError::NotFound(String::new()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::Internal(String::new()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
