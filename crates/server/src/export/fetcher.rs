//! Page fetching seam between the export pipeline and Shopify.

use std::future::Future;

use orderdesk_core::{OrderFilters, OrderPage};

use crate::shopify::{ShopifyClient, ShopifyError};

/// Something that can return one page of orders.
///
/// Implemented by [`ShopifyClient`]; tests substitute scripted sources.
pub trait OrderPageSource: Send + Sync {
    /// Fetch the page after `cursor` (or the first page when `None`).
    fn fetch_page(
        &self,
        filters: &OrderFilters,
        cursor: Option<String>,
    ) -> impl Future<Output = Result<OrderPage, ShopifyError>> + Send;
}

impl OrderPageSource for ShopifyClient {
    async fn fetch_page(
        &self,
        filters: &OrderFilters,
        cursor: Option<String>,
    ) -> Result<OrderPage, ShopifyError> {
        self.get_orders_page(filters, cursor).await
    }
}
