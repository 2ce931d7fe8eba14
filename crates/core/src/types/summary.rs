//! Summary statistics over a set of orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::OrderRecord;

/// Currency reported when there are no orders to take it from.
pub const DEFAULT_SUMMARY_CURRENCY: &str = "CAD";

/// Headline figures for a set of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_revenue: Decimal,
    pub total_orders: usize,
    pub average_order_value: Decimal,
    pub total_items: usize,
    pub paid_orders: usize,
    pub fulfilled_orders: usize,
    pub currency: String,
}

impl OrderSummary {
    /// Compute summary figures.
    ///
    /// Revenue is a plain sum of order totals; the currency is taken from
    /// the first order, so mixed-currency sets are summed as-is. Item count
    /// is the number of line items, not the sum of quantities.
    #[must_use]
    pub fn from_orders(orders: &[OrderRecord]) -> Self {
        let total_revenue: Decimal = orders.iter().map(|o| o.total).sum();
        let total_orders = orders.len();
        let average_order_value = if total_orders == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(total_orders)).round_dp(2)
        };

        Self {
            total_revenue,
            total_orders,
            average_order_value,
            total_items: orders.iter().map(|o| o.line_items.len()).sum(),
            paid_orders: orders
                .iter()
                .filter(|o| o.financial_status.eq_ignore_ascii_case("paid"))
                .count(),
            fulfilled_orders: orders
                .iter()
                .filter(|o| o.fulfillment_status.eq_ignore_ascii_case("fulfilled"))
                .count(),
            currency: orders
                .first()
                .map_or_else(|| DEFAULT_SUMMARY_CURRENCY.to_string(), |o| o.currency.clone()),
        }
    }
}
