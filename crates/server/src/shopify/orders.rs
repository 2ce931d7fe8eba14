//! Order listing for the Admin API.

use orderdesk_core::{OrderFilters, OrderPage};
use tracing::instrument;

use super::{
    ShopifyClient, ShopifyError,
    conversions::convert_order_connection,
    queries::{GetOrders, get_orders},
};

impl ShopifyClient {
    /// Get one page of orders matching `filters`.
    ///
    /// # Arguments
    ///
    /// * `filters` - Search filters, page size and sort order
    /// * `after` - Cursor of the previous page, `None` for the first page
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, filters), fields(page_size = filters.page_size, has_cursor = after.is_some()))]
    pub async fn get_orders_page(
        &self,
        filters: &OrderFilters,
        after: Option<String>,
    ) -> Result<OrderPage, ShopifyError> {
        let variables = get_orders::Variables {
            first: i64::from(filters.page_size),
            after,
            query: build_search_query(filters),
            sort_key: Some(filters.sort_key.as_graphql().to_string()),
            reverse: Some(filters.reverse),
        };

        let response = self.execute::<GetOrders>(variables).await?;
        let page = convert_order_connection(response.orders)?;

        tracing::debug!(
            orders = page.orders.len(),
            has_next_page = page.has_next_page,
            "Fetched orders page"
        );

        Ok(page)
    }
}

/// Build the Shopify search string for `filters`.
///
/// Clauses are joined with `AND`; `None` means no filtering at all.
#[must_use]
pub fn build_search_query(filters: &OrderFilters) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(min) = &filters.created_at_min {
        parts.push(format!("created_at:>='{min}'"));
    }
    if let Some(max) = &filters.created_at_max {
        parts.push(format!("created_at:<='{max}'"));
    }
    if let Some(status) = filters.financial_status {
        parts.push(format!("financial_status:{}", status.as_str()));
    }
    if let Some(status) = filters.fulfillment_status {
        parts.push(format!("fulfillment_status:{}", status.as_str()));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use orderdesk_core::{FinancialStatus, FulfillmentStatus};

    use super::*;

    #[test]
    fn test_no_filters_means_no_query() {
        assert_eq!(build_search_query(&OrderFilters::default()), None);
    }

    #[test]
    fn test_all_filters_joined_with_and() {
        let filters = OrderFilters {
            created_at_min: Some("2024-01-01".to_string()),
            created_at_max: Some("2024-01-31".to_string()),
            financial_status: Some(FinancialStatus::Paid),
            fulfillment_status: Some(FulfillmentStatus::Unfulfilled),
            ..OrderFilters::default()
        };

        assert_eq!(
            build_search_query(&filters).as_deref(),
            Some(
                "created_at:>='2024-01-01' AND created_at:<='2024-01-31' \
                 AND financial_status:paid AND fulfillment_status:unfulfilled"
            )
        );
    }

    #[test]
    fn test_single_filter() {
        let filters = OrderFilters {
            fulfillment_status: Some(FulfillmentStatus::Fulfilled),
            ..OrderFilters::default()
        };
        assert_eq!(
            build_search_query(&filters).as_deref(),
            Some("fulfillment_status:fulfilled")
        );
    }
}
