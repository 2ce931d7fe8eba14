//! Order filter sets.
//!
//! Filters arrive as loosely-typed strings (query parameters or JSON bodies)
//! and are normalized into an [`OrderFilters`] before any upstream call.
//! Normalization drops blank values, so an empty `financialStatus=` is
//! treated exactly like an absent one and never reaches the upstream query.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::status::{FinancialStatus, FulfillmentStatus};

/// Default number of orders requested per upstream page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size the upstream API accepts.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Default page ceiling for a collection run.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Errors produced while normalizing filter input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid financialStatus: {0}")]
    FinancialStatus(String),
    #[error("invalid fulfillmentStatus: {0}")]
    FulfillmentStatus(String),
    #[error("invalid sortKey: {0}")]
    SortKey(String),
    #[error("invalid {field}: {value} (expected ISO 8601 date or date-time)")]
    Date { field: &'static str, value: String },
}

/// Upstream order sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSortKey {
    /// Sort by order number.
    OrderNumber,
    /// Sort by total price.
    TotalPrice,
    /// Sort by creation date.
    #[default]
    CreatedAt,
    /// Sort by processed date.
    ProcessedAt,
    /// Sort by last update.
    UpdatedAt,
    /// Sort by customer name.
    CustomerName,
    /// Sort by financial status.
    FinancialStatus,
    /// Sort by fulfillment status.
    FulfillmentStatus,
    /// Sort by destination.
    Destination,
    /// Sort by ID.
    Id,
}

impl OrderSortKey {
    /// All sort keys, in documentation order.
    pub const ALL: [Self; 10] = [
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::ProcessedAt,
        Self::OrderNumber,
        Self::TotalPrice,
        Self::CustomerName,
        Self::FinancialStatus,
        Self::FulfillmentStatus,
        Self::Destination,
        Self::Id,
    ];

    /// Parse a sort key from a request parameter.
    ///
    /// Accepts the upstream enum spelling (`CREATED_AT`) as well as the
    /// lowercase and short forms used in dashboard links.
    #[must_use]
    pub fn from_str_param(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "order_number" | "number" => Some(Self::OrderNumber),
            "total_price" | "total" => Some(Self::TotalPrice),
            "created_at" | "created" => Some(Self::CreatedAt),
            "processed_at" | "processed" => Some(Self::ProcessedAt),
            "updated_at" | "updated" => Some(Self::UpdatedAt),
            "customer_name" | "customer" => Some(Self::CustomerName),
            "financial_status" | "payment" => Some(Self::FinancialStatus),
            "fulfillment_status" | "fulfillment" => Some(Self::FulfillmentStatus),
            "destination" => Some(Self::Destination),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    /// The upstream GraphQL enum value.
    #[must_use]
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::OrderNumber => "ORDER_NUMBER",
            Self::TotalPrice => "TOTAL_PRICE",
            Self::CreatedAt => "CREATED_AT",
            Self::ProcessedAt => "PROCESSED_AT",
            Self::UpdatedAt => "UPDATED_AT",
            Self::CustomerName => "CUSTOMER_NAME",
            Self::FinancialStatus => "FINANCIAL_STATUS",
            Self::FulfillmentStatus => "FULFILLMENT_STATUS",
            Self::Destination => "DESTINATION",
            Self::Id => "ID",
        }
    }
}

/// A normalized filter set, threaded unchanged through a collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilters {
    /// Only orders created at or after this instant.
    pub created_at_min: Option<String>,
    /// Only orders created at or before this instant.
    pub created_at_max: Option<String>,
    /// Only orders with this financial status.
    pub financial_status: Option<FinancialStatus>,
    /// Only orders with this fulfillment status.
    pub fulfillment_status: Option<FulfillmentStatus>,
    /// Orders per upstream page (1..=250).
    pub page_size: u32,
    /// Page ceiling for multi-page collection.
    pub max_pages: u32,
    /// Upstream sort key.
    pub sort_key: OrderSortKey,
    /// Sort descending when true.
    pub reverse: bool,
}

impl Default for OrderFilters {
    fn default() -> Self {
        Self {
            created_at_min: None,
            created_at_max: None,
            financial_status: None,
            fulfillment_status: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            sort_key: OrderSortKey::default(),
            reverse: true,
        }
    }
}

impl OrderFilters {
    /// Return a copy with the page size clamped into the accepted range.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Return a copy with a different page ceiling (at least one page).
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Upper bound on records a collection run with these filters can return.
    #[must_use]
    pub const fn record_bound(&self) -> u64 {
        self.page_size as u64 * self.max_pages as u64
    }
}

/// Raw, string-typed filter input.
///
/// Field names follow the public API (`createdAtMin`, `financialStatus`,
/// ...). Every field is optional and blank strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Accepts a JSON boolean as well as text, since dashboard request
    /// bodies send `"reverse": true`.
    #[serde(
        default,
        deserialize_with = "bool_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reverse: Option<String>,
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Text(String),
    }

    Ok(
        Option::<BoolOrString>::deserialize(deserializer)?.map(|value| match value {
            BoolOrString::Bool(flag) => flag.to_string(),
            BoolOrString::Text(text) => text,
        }),
    )
}

impl FilterParams {
    /// Normalize into an [`OrderFilters`] with default paging.
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if a present value is not a recognised status,
    /// sort key or date.
    pub fn into_filters(self) -> Result<OrderFilters, FilterError> {
        let created_at_min = non_blank(self.created_at_min)
            .map(|v| validate_date("createdAtMin", v))
            .transpose()?;
        let created_at_max = non_blank(self.created_at_max)
            .map(|v| validate_date("createdAtMax", v))
            .transpose()?;
        let financial_status = non_blank(self.financial_status)
            .map(|v| {
                v.parse::<FinancialStatus>()
                    .map_err(|_| FilterError::FinancialStatus(v))
            })
            .transpose()?;
        let fulfillment_status = non_blank(self.fulfillment_status)
            .map(|v| {
                v.parse::<FulfillmentStatus>()
                    .map_err(|_| FilterError::FulfillmentStatus(v))
            })
            .transpose()?;
        let sort_key = match non_blank(self.sort_key) {
            Some(v) => OrderSortKey::from_str_param(&v).ok_or(FilterError::SortKey(v))?,
            None => OrderSortKey::default(),
        };
        let reverse = non_blank(self.reverse).is_none_or(|v| v.eq_ignore_ascii_case("true"));

        Ok(OrderFilters {
            created_at_min,
            created_at_max,
            financial_status,
            fulfillment_status,
            sort_key,
            reverse,
            ..OrderFilters::default()
        })
    }
}

/// Treat empty and whitespace-only strings as absent.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Dates end up inside a quoted search expression, so only well-formed
/// ISO 8601 values are let through.
fn validate_date(field: &'static str, value: String) -> Result<String, FilterError> {
    let is_datetime = chrono::DateTime::parse_from_rfc3339(&value).is_ok();
    let is_date = chrono::NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_ok();
    if is_datetime || is_date {
        Ok(value)
    } else {
        Err(FilterError::Date { field, value })
    }
}
