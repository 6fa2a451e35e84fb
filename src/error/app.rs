use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; the client only sees a generic body.
        error!(error = %self, "request failed");
        let body = ApiErrorObject {
            code: "INTERNAL_ERROR".to_string(),
            message: "An internal server error occurred.".to_string(),
            details: None,
        };
        body.into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Standardized API error response payload.
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorObject {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn not_found() -> Self {
        Self::new("NOT_FOUND", "The requested resource was not found.")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            "METHOD_NOT_ALLOWED",
            "The method is not allowed for the requested URL.",
        )
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            "RATE_LIMIT",
            "Too many requests from this client, please try again later.",
        )
    }

    /// Wraps the object as `{"error": {...}}` with the given status.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(ApiErrorBody { inner: self })).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn internal_errors_hide_their_details() {
        let resp = AppError::InvalidConfig("secret detail".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": {
                    "code": "INTERNAL_ERROR",
                    "message": "An internal server error occurred."
                }
            })
        );
        assert!(!String::from_utf8_lossy(&bytes).contains("secret detail"));
    }
}
