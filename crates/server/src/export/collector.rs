//! Multi-page order collection.

use orderdesk_core::{OrderFilters, OrderRecord};
use thiserror::Error;

use super::{FailurePolicy, OrderPageSource};
use crate::shopify::ShopifyError;

/// Progress is reported after every this many pages.
pub const PROGRESS_EVERY: u32 = 5;

/// A page fetch failed and nothing usable was kept.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct CollectError {
    /// 1-based page number that failed.
    pub page: u32,
    #[source]
    pub source: ShopifyError,
}

/// Running totals handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectProgress {
    pub pages: u32,
    pub records: usize,
}

/// Result of a multi-page collection.
#[derive(Debug, Default)]
pub struct CollectedOrders {
    /// Records from every successful page, in upstream order.
    pub orders: Vec<OrderRecord>,
    /// Pages fetched successfully.
    pub pages_fetched: u32,
    /// Stopped at the page ceiling while upstream still had more.
    pub hit_page_ceiling: bool,
    /// Error text of the page that cut a best-effort run short.
    pub partial_error: Option<String>,
}

impl CollectedOrders {
    /// Whether a page failure cut this collection short.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.partial_error.is_some()
    }
}

/// Collect orders across pages until upstream is exhausted or
/// `filters.max_pages` pages have been fetched.
///
/// `on_progress` is called after every [`PROGRESS_EVERY`] pages.
///
/// # Errors
///
/// Returns `CollectError` if the first page fails, or if any page fails
/// under [`FailurePolicy::FailFast`]. Under [`FailurePolicy::BestEffort`],
/// a later failure ends collection with the records gathered so far and
/// the error recorded in [`CollectedOrders::partial_error`].
pub async fn collect_orders<S, F>(
    source: &S,
    filters: &OrderFilters,
    policy: FailurePolicy,
    mut on_progress: F,
) -> Result<CollectedOrders, CollectError>
where
    S: OrderPageSource + ?Sized,
    F: FnMut(CollectProgress) + Send,
{
    let max_pages = filters.max_pages.max(1);
    let mut collected = CollectedOrders::default();
    let mut cursor: Option<String> = None;

    loop {
        let page_number = collected.pages_fetched + 1;

        let page = match source.fetch_page(filters, cursor.take()).await {
            Ok(page) => page,
            Err(err) => {
                if page_number == 1 || policy == FailurePolicy::FailFast {
                    tracing::error!(page = page_number, error = %err, "Order collection failed");
                    return Err(CollectError {
                        page: page_number,
                        source: err,
                    });
                }
                tracing::warn!(
                    page = page_number,
                    collected = collected.orders.len(),
                    error = %err,
                    "Page failed; keeping orders collected so far"
                );
                collected.partial_error = Some(err.to_string());
                break;
            }
        };

        collected.orders.extend(page.orders);
        collected.pages_fetched = page_number;

        if page_number % PROGRESS_EVERY == 0 {
            tracing::info!(
                pages = page_number,
                records = collected.orders.len(),
                "Order collection progress"
            );
            on_progress(CollectProgress {
                pages: page_number,
                records: collected.orders.len(),
            });
        }

        match page.end_cursor {
            Some(next) if page.has_next_page => {
                if page_number >= max_pages {
                    collected.hit_page_ceiling = true;
                    break;
                }
                cursor = Some(next);
            }
            _ => break,
        }
    }

    tracing::info!(
        pages = collected.pages_fetched,
        records = collected.orders.len(),
        partial = collected.is_partial(),
        hit_page_ceiling = collected.hit_page_ceiling,
        "Order collection finished"
    );

    Ok(collected)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use orderdesk_core::OrderPage;
    use rust_decimal::Decimal;

    use super::*;

    pub fn order(id: &str) -> OrderRecord {
        OrderRecord {
            order_id: id.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            financial_status: "PAID".to_string(),
            fulfillment_status: "UNFULFILLED".to_string(),
            total: Decimal::new(1000, 2),
            currency: "CAD".to_string(),
            customer_name: String::new(),
            customer_email: String::new(),
            customer_address: String::new(),
            shipping_address: String::new(),
            billing_address: String::new(),
            shipping_line: None,
            line_items: vec![],
        }
    }

    /// Pages served in order; an `Err` entry fails that fetch.
    pub struct ScriptedSource {
        pages: Mutex<VecDeque<Result<OrderPage, ShopifyError>>>,
        pub cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSource {
        pub fn new(pages: Vec<Result<OrderPage, ShopifyError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                cursors: Mutex::new(vec![]),
            }
        }

        /// `count` pages of `per_page` orders, linked by cursors.
        pub fn linked(count: usize, per_page: usize) -> Self {
            Self::new((0..count).map(|i| Ok(page(i, per_page, i + 1 < count))).collect())
        }

        pub fn fetches(&self) -> usize {
            self.cursors.lock().unwrap().len()
        }
    }

    pub fn page(index: usize, per_page: usize, has_next_page: bool) -> OrderPage {
        OrderPage {
            orders: (0..per_page)
                .map(|n| order(&format!("#{index}-{n}")))
                .collect(),
            end_cursor: Some(format!("cursor-{index}")),
            has_next_page,
        }
    }

    impl OrderPageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _filters: &OrderFilters,
            cursor: Option<String>,
        ) -> Result<OrderPage, ShopifyError> {
            self.cursors.lock().unwrap().push(cursor);
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(OrderPage::default()))
        }
    }

    #[tokio::test]
    async fn test_collects_until_exhausted() {
        let source = ScriptedSource::linked(3, 2);
        let collected = collect_orders(
            &source,
            &OrderFilters::default(),
            FailurePolicy::BestEffort,
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(collected.orders.len(), 6);
        assert_eq!(collected.pages_fetched, 3);
        assert!(!collected.hit_page_ceiling);
        assert!(!collected.is_partial());
        assert_eq!(
            *source.cursors.lock().unwrap(),
            vec![
                None,
                Some("cursor-0".to_string()),
                Some("cursor-1".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_at_page_ceiling() {
        let source = ScriptedSource::linked(10, 1);
        let filters = OrderFilters::default().with_max_pages(4);

        let collected = collect_orders(&source, &filters, FailurePolicy::BestEffort, |_| {})
            .await
            .unwrap();

        assert_eq!(collected.pages_fetched, 4);
        assert_eq!(collected.orders.len(), 4);
        assert!(collected.hit_page_ceiling);
        assert_eq!(source.fetches(), 4);
    }

    #[tokio::test]
    async fn test_missing_cursor_ends_collection() {
        let mut first = page(0, 1, true);
        first.end_cursor = None;
        let source = ScriptedSource::new(vec![Ok(first), Ok(page(1, 1, false))]);

        let collected = collect_orders(
            &source,
            &OrderFilters::default(),
            FailurePolicy::BestEffort,
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(collected.pages_fetched, 1);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_an_error() {
        let source = ScriptedSource::new(vec![Err(ShopifyError::Status(500))]);

        let err = collect_orders(
            &source,
            &OrderFilters::default(),
            FailurePolicy::BestEffort,
            |_| {},
        )
        .await
        .unwrap_err();

        assert_eq!(err.page, 1);
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_best_effort_keeps_earlier_pages() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 2, true)),
            Ok(page(1, 2, true)),
            Err(ShopifyError::RateLimited(2)),
        ]);

        let collected = collect_orders(
            &source,
            &OrderFilters::default(),
            FailurePolicy::BestEffort,
            |_| {},
        )
        .await
        .unwrap();

        let ids: Vec<&str> = collected.orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["#0-0", "#0-1", "#1-0", "#1-1"]);
        assert_eq!(collected.pages_fetched, 2);
        assert_eq!(
            collected.partial_error.as_deref(),
            Some("Rate limited, retry after 2 seconds")
        );
    }

    #[tokio::test]
    async fn test_fail_fast_discards_earlier_pages() {
        let source = ScriptedSource::new(vec![
            Ok(page(0, 2, true)),
            Err(ShopifyError::Status(502)),
        ]);

        let err = collect_orders(
            &source,
            &OrderFilters::default(),
            FailurePolicy::FailFast,
            |_| {},
        )
        .await
        .unwrap_err();

        assert_eq!(err.page, 2);
    }

    #[tokio::test]
    async fn test_progress_reported_every_fifth_page() {
        let source = ScriptedSource::linked(12, 3);
        let mut reports = vec![];

        collect_orders(
            &source,
            &OrderFilters::default(),
            FailurePolicy::BestEffort,
            |p| reports.push(p),
        )
        .await
        .unwrap();

        assert_eq!(
            reports,
            vec![
                CollectProgress {
                    pages: 5,
                    records: 15
                },
                CollectProgress {
                    pages: 10,
                    records: 30
                },
            ]
        );
    }
}
