//! Unified error handling for the HTTP API.
//!
//! Every error response has the same JSON shape:
//!
//! ```json
//! { "success": false, "error": "message" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orderdesk_core::FilterError;
use serde::Serialize;
use thiserror::Error;

use crate::export::{CollectError, ExportError};
use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Multi-page collection failed.
    #[error("Shopify error: {0}")]
    Collect(#[from] CollectError),

    /// CSV rendering failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(_) | Self::Collect(_) => StatusCode::BAD_GATEWAY,
            Self::Export(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message placed in the response body.
    ///
    /// Upstream failures carry the raw upstream message so dashboard users
    /// can see what Shopify rejected; internal errors stay opaque.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Shopify(e) => e.to_string(),
            Self::Collect(e) => e.to_string(),
            Self::Export(e) => e.to_string(),
            Self::NotFound(m) | Self::BadRequest(m) => m.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Batch not found".to_string());
        assert_eq!(err.to_string(), "Not found: Batch not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Shopify(ShopifyError::Status(500)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_upstream_error_body_carries_raw_message() {
        let (status, json) = body_json(AppError::Shopify(ShopifyError::Status(500))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, json) = body_json(AppError::NotFound("Batch not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Batch not found");
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let (_, json) = body_json(AppError::Internal("db exploded".to_string())).await;
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn test_filter_error_is_bad_request() {
        let err: AppError = FilterError::SortKey("SIZE".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
