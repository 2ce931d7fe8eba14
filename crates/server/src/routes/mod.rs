//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//!
//! GET  /api/orders                          - One page of orders, or all with ?all=true
//! GET  /api/orders/csv                      - CSV download (all pages by default)
//! GET  /api/orders/summary                  - Summary statistics
//! POST /api/orders/batch                    - Start a background export job
//! GET  /api/orders/batch/{batchId}/status   - Poll a background export job
//! GET  /api/docs                            - API description
//! ```
//!
//! When a static directory is configured, every other path is served from it,
//! falling back to its `index.html` for client-side routing.

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use crate::state::AppState;

pub mod batch;
pub mod docs;
pub mod health;
pub mod orders;

/// API routes, without state or middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/csv", get(orders::csv))
        .route("/api/orders/summary", get(orders::summary))
        .route("/api/orders/batch", post(batch::create))
        .route("/api/orders/batch/{batch_id}/status", get(batch::status))
        .route("/api/docs", get(docs::docs))
}

/// The complete application router for `state`.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    let router = routes().layer(CorsLayer::permissive()).with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(static_files(&dir)),
        None => router,
    }
}

fn static_files(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{ExportConfig, ServerConfig, ShopifyConfig};

    /// State whose upstream is never reachable; only routes that answer
    /// before calling Shopify are exercised here.
    fn offline_state() -> AppState {
        AppState::new(ServerConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            shopify: ShopifyConfig {
                store: "test-store.myshopify.com".to_string(),
                api_version: "2025-01".to_string(),
                access_token: SecretString::from("shpat_unit_test_token"),
                endpoint_override: Some("http://127.0.0.1:9/graphql".parse().unwrap()),
            },
            export: ExportConfig::default(),
            static_dir: None,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        })
        .unwrap()
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app(offline_state())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(offline_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_batch_route() {
        let (status, body) = get("/api/orders/batch/nope/status").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Batch not found");
    }

    #[tokio::test]
    async fn test_bad_filter_is_rejected_before_upstream() {
        let (status, body) = get("/api/orders/summary?sortKey=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_dashboard_batch_body_is_accepted() {
        let (status, body) = post_json(
            "/api/orders/batch",
            r#"{"batchSize":100,"maxBatches":100,"all":false,"limit":50,"createdAtMin":"","createdAtMax":"","financialStatus":"","fulfillmentStatus":"","sortKey":"CREATED_AT","reverse":true}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["estimatedTime"], "200 seconds");
    }

    #[tokio::test]
    async fn test_zero_max_batches_estimates_one_page() {
        let (status, body) = post_json("/api/orders/batch", r#"{"maxBatches":0}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["estimatedTime"], "2 seconds");
    }

    #[tokio::test]
    async fn test_malformed_batch_body_is_json_error() {
        for body in [r#"{"batchSize": -1}"#, "{not json", r#"{"reverse": 3}"#] {
            let (status, json) = post_json("/api/orders/batch", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(json["success"], false);
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_bad_query_string_is_json_error() {
        let (status, body) = get("/api/orders?limit=1&limit=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
