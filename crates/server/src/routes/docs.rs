//! Machine-readable API description.

use axum::Json;
use orderdesk_core::{
    DEFAULT_PAGE_SIZE, FinancialStatus, FulfillmentStatus, MAX_PAGE_SIZE, OrderSortKey,
};
use serde_json::{Value, json};

use super::batch::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_BATCHES};
use super::orders::{CSV_MAX_PAGES, LIST_ALL_MAX_PAGES};

/// Static description of endpoints, parameters and limits.
pub async fn docs() -> Json<Value> {
    let financial: Vec<_> = FinancialStatus::ALL.iter().map(|s| s.as_str()).collect();
    let fulfillment: Vec<_> = FulfillmentStatus::ALL.iter().map(|s| s.as_str()).collect();
    let sort_keys: Vec<_> = OrderSortKey::ALL.iter().map(|k| k.as_graphql()).collect();

    let order_parameters = json!({
        "limit": {
            "type": "number",
            "default": DEFAULT_PAGE_SIZE,
            "max": MAX_PAGE_SIZE,
            "description": "Number of orders per page"
        },
        "after": {
            "type": "string",
            "description": "Cursor from a previous page's pagination.endCursor"
        },
        "all": {
            "type": "boolean",
            "default": false,
            "description": format!("Fetch every page, up to {LIST_ALL_MAX_PAGES} pages")
        },
        "createdAtMin": {
            "type": "string",
            "format": "ISO 8601 (2024-01-01T00:00:00Z)",
            "description": "Only orders created at or after this date"
        },
        "createdAtMax": {
            "type": "string",
            "format": "ISO 8601 (2024-12-31T23:59:59Z)",
            "description": "Only orders created at or before this date"
        },
        "financialStatus": {
            "type": "string",
            "options": financial,
            "description": "Filter by payment status"
        },
        "fulfillmentStatus": {
            "type": "string",
            "options": fulfillment,
            "description": "Filter by fulfillment status"
        },
        "sortKey": {
            "type": "string",
            "default": "CREATED_AT",
            "options": sort_keys,
            "description": "Sort orders by field"
        },
        "reverse": {
            "type": "boolean",
            "default": true,
            "description": "Sort in descending order"
        }
    });

    Json(json!({
        "title": "Order Desk API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/orders": {
                "method": "GET",
                "description": "Fetch Shopify orders with filtering and cursor pagination",
                "parameters": order_parameters,
                "examples": {
                    "Recent orders": "/api/orders?limit=25",
                    "All paid orders": "/api/orders?all=true&financialStatus=paid",
                    "Orders from date range": "/api/orders?createdAtMin=2024-01-01T00:00:00Z&createdAtMax=2024-01-31T23:59:59Z",
                    "Unfulfilled orders": "/api/orders?fulfillmentStatus=unfulfilled&limit=100"
                }
            },
            "/api/orders/csv": {
                "method": "GET",
                "description": "Export orders as CSV, one row per line item",
                "parameters": "Same as /api/orders (defaults to all=true)",
                "note": "Downloads a CSV file directly"
            },
            "/api/orders/summary": {
                "method": "GET",
                "description": "Revenue, order count, average order value and status counts",
                "parameters": "Same as /api/orders"
            },
            "/api/orders/batch": {
                "method": "POST",
                "description": "Start a background export job",
                "body": {
                    "batchSize": { "type": "number", "default": DEFAULT_BATCH_SIZE },
                    "maxBatches": { "type": "number", "default": DEFAULT_MAX_BATCHES },
                    "filters": "createdAtMin, createdAtMax, financialStatus, fulfillmentStatus"
                }
            },
            "/api/orders/batch/{batchId}/status": {
                "method": "GET",
                "description": "Poll a background export job"
            }
        },
        "limits": {
            "Max records per request": format!("{MAX_PAGE_SIZE} (for single page)"),
            "Max pages for all=true": LIST_ALL_MAX_PAGES,
            "Max pages for CSV export": CSV_MAX_PAGES,
            "Rate limits": "Shopify API limits apply",
            "Timeout": "30 seconds per upstream request"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_docs_lists_endpoints() {
        let Json(docs) = docs().await;
        let endpoints = docs["endpoints"].as_object().unwrap_or_else(|| panic!("no endpoints"));
        assert!(endpoints.contains_key("/api/orders"));
        assert!(endpoints.contains_key("/api/orders/csv"));
        assert!(endpoints.contains_key("/api/orders/batch"));
        assert_eq!(
            docs["endpoints"]["/api/orders"]["parameters"]["financialStatus"]["options"][3],
            "paid"
        );
    }
}
