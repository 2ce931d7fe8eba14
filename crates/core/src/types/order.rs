//! Normalized order records.
//!
//! An [`OrderRecord`] is the flat projection of a Shopify order that every
//! other part of the system works with: the JSON API, the summary stats and
//! the CSV export. Records are built once from an upstream response and
//! never mutated afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fallback label for line items whose product has no collection.
pub const NO_COLLECTION: &str = "No Collection";

/// Fallback label for line items whose product has no sub-brand metafield.
pub const NO_SUB_BRAND: &str = "No Sub-Brand";

/// A normalized order with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order display name (e.g., `#1001`).
    pub order_id: String,
    /// Creation timestamp as reported upstream (ISO 8601).
    pub created_at: String,
    /// Upstream display financial status (e.g., `PAID`).
    pub financial_status: String,
    /// Upstream display fulfillment status (e.g., `UNFULFILLED`).
    pub fulfillment_status: String,
    /// Current order total in shop currency.
    pub total: Decimal,
    /// ISO 4217 currency code of `total`.
    pub currency: String,
    /// Customer full name, empty when unknown.
    pub customer_name: String,
    /// Customer email, empty when unknown.
    pub customer_email: String,
    /// Customer default address, empty when unknown.
    pub customer_address: String,
    /// Shipping address, empty when absent.
    pub shipping_address: String,
    /// Billing address, empty when absent.
    pub billing_address: String,
    /// Shipping method, if the order was shipped.
    pub shipping_line: Option<ShippingLine>,
    /// Line items in upstream order.
    pub line_items: Vec<LineItem>,
}

/// Shipping method charged on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    /// Shipping method title.
    pub title: String,
    /// Original shipping price.
    pub price: Decimal,
    /// ISO 4217 currency code of `price`.
    pub currency: String,
}

/// A single purchased product on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product title at time of purchase.
    pub title: String,
    /// Quantity purchased.
    pub quantity: i64,
    /// First collection the product belongs to.
    pub collection: String,
    /// Product sub-brand label.
    pub sub_brand: String,
}

/// One page of orders returned by an upstream fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPage {
    /// Records on this page, in upstream order.
    pub orders: Vec<OrderRecord>,
    /// Cursor for the next page, present when more pages exist.
    pub end_cursor: Option<String>,
    /// Whether another page follows this one.
    pub has_next_page: bool,
}

/// Format a customer name from optional first/last parts.
///
/// Missing parts are treated as empty and the result is trimmed, so a
/// customer with only a last name yields just that name.
#[must_use]
pub fn format_customer_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
        .trim()
        .to_string()
}

/// Format a postal address as `"{address1}, {city}, {country}"`.
///
/// Missing components render as empty strings so the position of each part
/// stays stable in exported data.
#[must_use]
pub fn format_address(address1: Option<&str>, city: Option<&str>, country: Option<&str>) -> String {
    format!(
        "{}, {}, {}",
        address1.unwrap_or_default(),
        city.unwrap_or_default(),
        country.unwrap_or_default()
    )
}
