//! CSV rendering of orders, one row per line item.

use chrono::{DateTime, SecondsFormat, Utc};
use orderdesk_core::OrderRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Header row, in output order.
pub const CSV_COLUMNS: [&str; 18] = [
    "order_id",
    "created_at",
    "financial_status",
    "fulfillment_status",
    "total",
    "currency",
    "customer_name",
    "customer_email",
    "customer_address",
    "shipping_address",
    "billing_address",
    "shipping_line_title",
    "shipping_line_price",
    "shipping_line_currency",
    "product_title",
    "product_quantity",
    "product_collection",
    "product_sub_brand",
];

/// CSV export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Serialization(String),
}

impl From<::csv::Error> for ExportError {
    fn from(e: ::csv::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// One line item of one order, with the order's fields repeated.
///
/// Field order matches [`CSV_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow<'a> {
    pub order_id: &'a str,
    pub created_at: &'a str,
    pub financial_status: &'a str,
    pub fulfillment_status: &'a str,
    pub total: Decimal,
    pub currency: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub customer_address: &'a str,
    pub shipping_address: &'a str,
    pub billing_address: &'a str,
    pub shipping_line_title: &'a str,
    pub shipping_line_price: Option<Decimal>,
    pub shipping_line_currency: &'a str,
    pub product_title: &'a str,
    pub product_quantity: i64,
    pub product_collection: &'a str,
    pub product_sub_brand: &'a str,
}

/// Flatten orders into rows, preserving order and line item sequence.
///
/// Orders without line items produce no rows.
#[must_use]
pub fn flatten_orders(orders: &[OrderRecord]) -> Vec<CsvRow<'_>> {
    orders
        .iter()
        .flat_map(|order| {
            let shipping = order.shipping_line.as_ref();
            order.line_items.iter().map(move |item| CsvRow {
                order_id: &order.order_id,
                created_at: &order.created_at,
                financial_status: &order.financial_status,
                fulfillment_status: &order.fulfillment_status,
                total: order.total,
                currency: &order.currency,
                customer_name: &order.customer_name,
                customer_email: &order.customer_email,
                customer_address: &order.customer_address,
                shipping_address: &order.shipping_address,
                billing_address: &order.billing_address,
                shipping_line_title: shipping.map_or("", |s| s.title.as_str()),
                shipping_line_price: shipping.map(|s| s.price),
                shipping_line_currency: shipping.map_or("", |s| s.currency.as_str()),
                product_title: &item.title,
                product_quantity: item.quantity,
                product_collection: &item.collection,
                product_sub_brand: &item.sub_brand,
            })
        })
        .collect()
}

/// Render orders as CSV text with a header row.
///
/// The header is written even when there are no rows.
///
/// # Errors
///
/// Returns `ExportError::Serialization` if a row cannot be written.
pub fn render_csv(orders: &[OrderRecord]) -> Result<String, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_COLUMNS)?;
    for row in flatten_orders(orders) {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Serialization(e.to_string()))
}

/// Download filename for an export generated at `now`.
///
/// `2024-01-02T03:04:05.678Z` becomes `orders-2024-01-02T03-04-05-678Z.csv`.
#[must_use]
pub fn csv_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("orders-{stamp}.csv")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use orderdesk_core::{LineItem, ShippingLine};

    use super::*;

    fn item(title: &str, quantity: i64) -> LineItem {
        LineItem {
            title: title.to_string(),
            quantity,
            collection: "Tops".to_string(),
            sub_brand: "Core".to_string(),
        }
    }

    fn order(id: &str, items: Vec<LineItem>) -> OrderRecord {
        OrderRecord {
            order_id: id.to_string(),
            created_at: "2024-03-01T10:00:00Z".to_string(),
            financial_status: "PAID".to_string(),
            fulfillment_status: "FULFILLED".to_string(),
            total: Decimal::new(4250, 2),
            currency: "CAD".to_string(),
            customer_name: "Ada Lovelace".to_string(),
            customer_email: "ada@example.com".to_string(),
            customer_address: "1 Main St, Toronto, Canada".to_string(),
            shipping_address: "2 Side St, Ottawa, Canada".to_string(),
            billing_address: String::new(),
            shipping_line: Some(ShippingLine {
                title: "Standard".to_string(),
                price: Decimal::new(500, 2),
                currency: "CAD".to_string(),
            }),
            line_items: items,
        }
    }

    #[test]
    fn test_one_row_per_line_item() {
        let orders = vec![
            order("#1001", vec![item("Tee", 2), item("Hat", 1)]),
            order("#1002", vec![item("Sock", 3)]),
        ];

        let rows = flatten_orders(&orders);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].order_id, "#1001");
        assert_eq!(rows[0].product_title, "Tee");
        assert_eq!(rows[1].order_id, "#1001");
        assert_eq!(rows[1].product_title, "Hat");
        assert_eq!(rows[2].order_id, "#1002");
        assert_eq!(rows[2].product_quantity, 3);
    }

    #[test]
    fn test_orders_without_line_items_are_skipped() {
        let orders = vec![order("#1", vec![]), order("#2", vec![item("Tee", 1)])];
        let rows = flatten_orders(&orders);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_id, "#2");
    }

    #[test]
    fn test_render_csv() {
        let mut no_shipping = order("#1002", vec![item("Sock, wool", 3)]);
        no_shipping.shipping_line = None;
        let orders = vec![order("#1001", vec![item("Tee", 2)]), no_shipping];

        let csv = render_csv(&orders).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "#1001,2024-03-01T10:00:00Z,PAID,FULFILLED,42.50,CAD,Ada Lovelace,ada@example.com,\
             \"1 Main St, Toronto, Canada\",\"2 Side St, Ottawa, Canada\",,Standard,5.00,CAD,\
             Tee,2,Tops,Core"
        );
        assert!(lines[2].contains(",,,,\"Sock, wool\",3,"));
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = render_csv(&[]).unwrap();
        assert_eq!(csv, format!("{}\n", CSV_COLUMNS.join(",")));
    }

    #[test]
    fn test_csv_filename() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(678);
        assert_eq!(csv_filename(now), "orders-2024-01-02T03-04-05-678Z.csv");
    }
}
