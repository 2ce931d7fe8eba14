//! Order listing, CSV export and summary handlers.

use axum::{Json, extract::State, http::header, response::IntoResponse};
use chrono::Utc;
use orderdesk_core::{FilterParams, OrderFilters, OrderRecord, OrderSummary, non_blank};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppError,
    export::{OrderPageSource, collect_orders, csv_filename, render_csv},
    extract::ApiQuery,
    state::AppState,
};

/// Page ceiling for `GET /api/orders?all=true` and the summary.
pub const LIST_ALL_MAX_PAGES: u32 = 100;

/// Page ceiling for CSV exports.
pub const CSV_MAX_PAGES: u32 = 200;

/// Query parameters shared by the order endpoints.
///
/// Everything arrives as text; numbers and booleans are parsed here so a bad
/// value produces a JSON error instead of a plain-text rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub all: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

impl OrdersQuery {
    /// Normalized filters with the requested page size and the given ceiling.
    fn order_filters(&self, max_pages: u32) -> Result<OrderFilters, AppError> {
        let filters = self.filters.clone().into_filters()?;
        let page_size = parse_number("limit", self.limit.clone())?.unwrap_or(filters.page_size);
        Ok(filters.with_page_size(page_size).with_max_pages(max_pages))
    }

    fn wants_all(&self, default: bool) -> bool {
        non_blank(self.all.clone()).map_or(default, |v| v.eq_ignore_ascii_case("true"))
    }
}

/// Parse an optional positive integer parameter.
pub(crate) fn parse_number(field: &str, value: Option<String>) -> Result<Option<u32>, AppError> {
    non_blank(value)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| AppError::BadRequest(format!("invalid {field}: {v}")))
        })
        .transpose()
}

/// Cursor information for single-page responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
    pub current_page: u32,
    pub total_fetched: usize,
}

/// `GET /api/orders` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub success: bool,
    pub data: Vec<OrderRecord>,
    pub pagination: Option<Pagination>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_error: Option<String>,
}

/// `GET /api/orders/summary` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: OrderSummary,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_error: Option<String>,
}

/// Orders gathered for one request.
struct LoadedOrders {
    orders: Vec<OrderRecord>,
    pagination: Option<Pagination>,
    partial_error: Option<String>,
}

/// Fetch either every page (up to `max_pages`) or just the requested one.
async fn load_orders(
    state: &AppState,
    query: &OrdersQuery,
    all: bool,
    max_pages: u32,
) -> Result<LoadedOrders, AppError> {
    let source = state.shopify();
    let filters = query.order_filters(max_pages)?;

    if all {
        let collected =
            collect_orders(source, &filters, state.config().export.failure_policy, |_| {})
                .await?;
        return Ok(LoadedOrders {
            orders: collected.orders,
            pagination: None,
            partial_error: collected.partial_error,
        });
    }

    let current_page = parse_number("page", query.page.clone())?.unwrap_or(1);
    let page = source
        .fetch_page(&filters, non_blank(query.after.clone()))
        .await?;
    let pagination = Pagination {
        has_next_page: page.has_next_page,
        end_cursor: page.end_cursor,
        current_page,
        total_fetched: page.orders.len(),
    };

    Ok(LoadedOrders {
        orders: page.orders,
        pagination: Some(pagination),
        partial_error: None,
    })
}

/// List orders as JSON.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<OrdersResponse>, AppError> {
    let all = query.wants_all(false);
    let loaded = load_orders(&state, &query, all, LIST_ALL_MAX_PAGES).await?;

    Ok(Json(OrdersResponse {
        success: true,
        total: loaded.orders.len(),
        data: loaded.orders,
        pagination: loaded.pagination,
        partial_error: loaded.partial_error,
    }))
}

/// Download orders as a CSV attachment.
#[instrument(skip(state))]
pub async fn csv(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let all = query.wants_all(true);
    let loaded = load_orders(&state, &query, all, CSV_MAX_PAGES).await?;

    let body = render_csv(&loaded.orders)?;
    let filename = csv_filename(Utc::now());

    tracing::info!(
        orders = loaded.orders.len(),
        bytes = body.len(),
        partial = loaded.partial_error.is_some(),
        %filename,
        "CSV export generated"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}

/// Summary statistics for the matching orders.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let all = query.wants_all(false);
    let loaded = load_orders(&state, &query, all, LIST_ALL_MAX_PAGES).await?;

    Ok(Json(SummaryResponse {
        success: true,
        summary: OrderSummary::from_orders(&loaded.orders),
        total: loaded.orders.len(),
        partial_error: loaded.partial_error,
    }))
}
