//! Integration tests for order listing and summary endpoints.

use axum::http::StatusCode;
use orderdesk_integration_tests::{FakePage, TestServer, order_node, orders_page};

#[tokio::test]
async fn test_single_page_reports_cursor() {
    let (server, _shopify) =
        TestServer::with_pages(vec![orders_page(1001, 2), orders_page(1003, 2)]).await;

    let (status, body) = server.get_json("/api/orders").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["order_id"], "#1001");
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["pagination"]["endCursor"], "cursor-1");
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["totalFetched"], 2);
}

#[tokio::test]
async fn test_after_cursor_is_forwarded() {
    let (server, shopify) =
        TestServer::with_pages(vec![orders_page(1001, 2), orders_page(1003, 1)]).await;

    let (status, body) = server.get_json("/api/orders?after=cursor-1&page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["order_id"], "#1003");
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(shopify.requests()[0]["after"], "cursor-1");
}

#[tokio::test]
async fn test_all_collects_every_page() {
    let (server, shopify) = TestServer::with_pages(vec![
        orders_page(1, 2),
        orders_page(3, 2),
        orders_page(5, 1),
    ])
    .await;

    let (status, body) = server.get_json("/api/orders?all=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert!(body["pagination"].is_null());
    assert!(body.get("partialError").is_none());
    assert_eq!(shopify.requests().len(), 3);
}

#[tokio::test]
async fn test_filters_become_search_query() {
    let (server, shopify) = TestServer::with_pages(vec![orders_page(1, 1)]).await;

    let (status, _) = server
        .get_json("/api/orders?limit=25&financialStatus=paid&createdAtMin=2024-01-01")
        .await;

    assert_eq!(status, StatusCode::OK);
    let variables = &shopify.requests()[0];
    assert_eq!(variables["first"], 25);
    assert_eq!(
        variables["query"],
        "created_at:>='2024-01-01' AND financial_status:paid"
    );
    assert_eq!(variables["sortKey"], "CREATED_AT");
    assert_eq!(variables["reverse"], true);
}

#[tokio::test]
async fn test_invalid_parameters_are_rejected() {
    let (server, shopify) = TestServer::with_pages(vec![orders_page(1, 1)]).await;

    let (status, body) = server.get_json("/api/orders?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap_or_default().contains("limit"));

    let (status, _) = server.get_json("/api/orders?fulfillmentStatus=lost").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(shopify.requests().is_empty());
}

#[tokio::test]
async fn test_upstream_errors_map_to_bad_gateway() {
    let (server, _shopify) = TestServer::with_pages(vec![FakePage::Status(401)]).await;
    let (status, body) = server.get_json("/api/orders").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized: Invalid or expired access token");

    let (server, _shopify) = TestServer::with_pages(vec![FakePage::Errors(vec![
        "Field 'orders' doesn't exist".to_string(),
    ])])
    .await;
    let (status, body) = server.get_json("/api/orders").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "GraphQL errors: Field 'orders' doesn't exist");
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let (server, _shopify) = TestServer::with_pages(vec![FakePage::Status(429)]).await;
    let (status, body) = server.get_json("/api/orders").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Rate limited, retry after 7 seconds");
}

#[tokio::test]
async fn test_later_page_failure_returns_partial_result() {
    let (server, _shopify) =
        TestServer::with_pages(vec![orders_page(1, 2), FakePage::Status(500)]).await;

    let (status, body) = server.get_json("/api/orders?all=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["partialError"], "HTTP error! status: 500");
}

#[tokio::test]
async fn test_summary_totals() {
    let (server, _shopify) = TestServer::with_pages(vec![FakePage::Orders(vec![
        order_node("#1", "25.00", "PAID", &[("Candle", 1), ("Wick", 2)]),
        order_node("#2", "50.00", "PENDING", &[("Candle", 3)]),
    ])])
    .await;

    let (status, body) = server.get_json("/api/orders/summary?all=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["summary"]["totalOrders"], 2);
    assert_eq!(body["summary"]["totalRevenue"], "75.00");
    assert_eq!(body["summary"]["totalItems"], 3);
    assert_eq!(body["summary"]["paidOrders"], 1);
    assert_eq!(body["summary"]["currency"], "CAD");
}
