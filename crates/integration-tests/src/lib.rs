//! Integration tests for orderdesk.
//!
//! Every test runs the real HTTP server against an in-process fake of the
//! Shopify Admin GraphQL endpoint, so no store credentials are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p orderdesk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `orders_api` - Listing, pagination, filters and summary
//! - `csv_export` - CSV download shape and headers
//! - `batch_jobs` - Background export jobs and status polling
//! - `health_docs` - Health check and API description

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use orderdesk_server::config::{ExportConfig, ServerConfig, ShopifyConfig};
use orderdesk_server::routes;
use orderdesk_server::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// One scripted upstream response, selected by the request's cursor.
#[derive(Debug, Clone)]
pub enum FakePage {
    /// A page of order nodes.
    Orders(Vec<Value>),
    /// An HTTP error status with an empty body.
    Status(u16),
    /// A 200 response carrying GraphQL errors and no data.
    Errors(Vec<String>),
}

#[derive(Clone)]
struct FakeState {
    pages: Arc<Vec<FakePage>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// A running fake of the Shopify Admin GraphQL endpoint.
///
/// Page `n` is served for cursor `cursor-n` (no cursor serves page 0), and
/// every page but the last reports a next page.
pub struct FakeShopify {
    pub url: Url,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeShopify {
    /// Start the fake on an ephemeral port.
    pub async fn start(pages: Vec<FakePage>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            pages: Arc::new(pages),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/graphql", post(fake_graphql))
            .with_state(state);
        let addr = serve(app).await;

        Self {
            url: Url::parse(&format!("http://{addr}/graphql")).expect("valid fake url"),
            requests,
        }
    }

    /// GraphQL `variables` of every request received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("requests lock").clone()
    }
}

async fn fake_graphql(State(state): State<FakeState>, Json(body): Json<Value>) -> Response {
    let variables = body["variables"].clone();
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(variables.clone());

    let index = variables["after"]
        .as_str()
        .and_then(|cursor| cursor.strip_prefix("cursor-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);

    match state.pages.get(index) {
        Some(FakePage::Orders(nodes)) => {
            let has_next = index + 1 < state.pages.len();
            let edges: Vec<Value> = nodes.iter().map(|node| json!({ "node": node })).collect();
            Json(json!({
                "data": {
                    "orders": {
                        "pageInfo": {
                            "hasNextPage": has_next,
                            "endCursor": format!("cursor-{}", index + 1),
                        },
                        "edges": edges,
                    }
                }
            }))
            .into_response()
        }
        Some(FakePage::Status(code)) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut response = status.into_response();
            if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("7"));
            }
            response
        }
        Some(FakePage::Errors(messages)) => {
            let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
            Json(json!({ "errors": errors })).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// An upstream order node with the given display name, total and line items.
pub fn order_node(name: &str, total: &str, financial: &str, items: &[(&str, i64)]) -> Value {
    let line_items: Vec<Value> = items
        .iter()
        .map(|(title, quantity)| {
            json!({
                "title": title,
                "quantity": quantity,
                "product": {
                    "collections": { "edges": [{ "node": { "title": "Candles" } }] },
                    "metafield": { "value": "Glow" }
                }
            })
        })
        .collect();

    json!({
        "id": format!("gid://shopify/Order/{}", name.trim_start_matches('#')),
        "name": name,
        "createdAt": "2024-03-01T12:00:00Z",
        "displayFinancialStatus": financial,
        "displayFulfillmentStatus": "UNFULFILLED",
        "currentTotalPriceSet": { "shopMoney": { "amount": total, "currencyCode": "CAD" } },
        "customer": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "defaultAddress": { "address1": "1 Main St", "city": "Toronto", "country": "Canada" }
        },
        "shippingAddress": { "address1": "1 Main St", "city": "Toronto", "country": "Canada" },
        "billingAddress": null,
        "shippingLine": {
            "title": "Standard",
            "originalPriceSet": { "shopMoney": { "amount": "5.00", "currencyCode": "CAD" } }
        },
        "lineItems": { "edges": line_items.into_iter().map(|node| json!({ "node": node })).collect::<Vec<_>>() }
    })
}

/// A page of `count` single-item orders named from `#{start}` upward.
pub fn orders_page(start: u32, count: u32) -> FakePage {
    FakePage::Orders(
        (start..start + count)
            .map(|n| order_node(&format!("#{n}"), "10.00", "PAID", &[("Candle", 1)]))
            .collect(),
    )
}

/// Server configuration pointing at a fake upstream.
pub fn test_config(shopify_url: Url) -> ServerConfig {
    ServerConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        shopify: ShopifyConfig {
            store: "test-store.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_integration_test_token"),
            endpoint_override: Some(shopify_url),
        },
        export: ExportConfig::default(),
        static_dir: None,
        json_logs: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running orderdesk server and a client for it.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start the server against `config` on an ephemeral port.
    pub async fn start(config: ServerConfig) -> Self {
        let state = AppState::new(config).expect("Failed to build app state");
        let addr = serve(routes::app(state)).await;

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    /// Start a fake upstream serving `pages` and a server in front of it.
    pub async fn with_pages(pages: Vec<FakePage>) -> (Self, FakeShopify) {
        let shopify = FakeShopify::start(pages).await;
        let server = Self::start(test_config(shopify.url.clone())).await;
        (server, shopify)
    }

    /// `GET` a path and return the status and JSON body.
    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request failed");
        let status = StatusCode::from_u16(response.status().as_u16()).expect("valid status");
        (status, response.json().await.expect("JSON body"))
    }

    /// `POST` a JSON body and return the status and JSON response.
    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("request failed");
        let status = StatusCode::from_u16(response.status().as_u16()).expect("valid status");
        (status, response.json().await.expect("JSON body"))
    }

    /// Poll a job's status endpoint until it leaves `processing`.
    pub async fn wait_for_job(&self, status_endpoint: &str) -> Value {
        for _ in 0..200 {
            let (status, body) = self.get_json(status_endpoint).await;
            assert_eq!(status, StatusCode::OK, "status poll failed: {body}");
            if body["status"] != "processing" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("job at {status_endpoint} did not finish");
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    addr
}
