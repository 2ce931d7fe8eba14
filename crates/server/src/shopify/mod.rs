//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Shopify Admin API access token.**
//!
//! Only the read-only `orders` query is issued, but the token itself usually
//! grants far more. Keep the server off the public internet.
//!
//! # Architecture
//!
//! - `graphql_client`'s `GraphQLQuery` trait describes each query
//! - Requests are made with `reqwest` directly
//! - Filters travel as GraphQL variables, never spliced into query text
//! - One attempt per call; retrying is the caller's decision
//!
//! # Example
//!
//! ```rust,ignore
//! use orderdesk_server::shopify::ShopifyClient;
//!
//! let client = ShopifyClient::new(&config.shopify)?;
//! let page = client.get_orders_page(&filters, None).await?;
//! ```

mod client;
mod conversions;
mod orders;
pub mod queries;

pub use client::ShopifyClient;
pub use orders::build_search_query;

use thiserror::Error;

/// Errors that can occur when talking to the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response carried neither data nor errors.
    #[error("No data in response")]
    MissingData,

    /// A money amount was not a valid decimal.
    #[error("Invalid money amount: {0}")]
    InvalidAmount(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
