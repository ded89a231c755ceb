//! Error types for the gateway.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur in the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The token endpoint rejected the client-credentials exchange.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A page or lookup request returned a non-success status.
    #[error("Upstream fetch failed with status {status}: {body}")]
    Fetch { status: u16, body: String },

    /// A resolution-chain stage found nothing. Recoverable, logged per stage.
    #[error("Resolution found nothing: {0}")]
    ResolutionNotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed caller-supplied path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// HTTP transport error.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server startup error.
    #[error("Server error: {0}")]
    Server(String),
}

/// Error response body for HTTP endpoints.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Authentication(body) => {
                tracing::error!(body = %body, "Upstream authentication failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTHENTICATION_ERROR",
                    "Upstream authentication failed",
                    None,
                )
            }
            Self::Fetch { status, body } => {
                tracing::error!(status = status, body = %body, "Upstream fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FETCH_ERROR",
                    "Upstream fetch failed",
                    Some(format!("status {status}")),
                )
            }
            Self::ResolutionNotFound(msg) => {
                tracing::info!(message = %msg, "Resolution found nothing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RESOLUTION_FAILED",
                    msg.as_str(),
                    None,
                )
            }
            Self::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                msg.as_str(),
                None,
            ),
            Self::InvalidPath(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_PATH", msg.as_str(), None)
            }
            Self::Http(e) => {
                tracing::error!(error = %e, "HTTP transport error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_HTTP_ERROR",
                    "Upstream request failed",
                    Some(e.to_string()),
                )
            }
            Self::Serialization(e) => {
                tracing::error!(error = %e, "Serialization error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERIALIZATION_ERROR",
                    "Failed to serialize response",
                    Some(e.to_string()),
                )
            }
            Self::Server(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
                msg.as_str(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_error_display() {
        let err = GatewayError::Authentication("invalid_client".to_string());
        assert_eq!(err.to_string(), "Authentication failed: invalid_client");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = GatewayError::Fetch {
            status: 503,
            body: "upstream down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Upstream fetch failed with status 503: upstream down"
        );
    }

    #[test]
    fn test_invalid_path_maps_to_bad_request() {
        let response = GatewayError::InvalidPath("too few segments".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_fetch_maps_to_internal_error() {
        let response = GatewayError::Fetch {
            status: 404,
            body: String::new(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_serialization() {
        let resp = ErrorResponse {
            error: "test error".to_string(),
            code: "TEST_ERROR".to_string(),
            details: Some("additional info".to_string()),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("test error"));
        assert!(json.contains("TEST_ERROR"));
        assert!(json.contains("additional info"));
    }

    #[test]
    fn test_error_response_without_details() {
        let resp = ErrorResponse {
            error: "test error".to_string(),
            code: "TEST_ERROR".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("details"));
    }
}
