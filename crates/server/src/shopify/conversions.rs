//! Conversions from `GetOrders` response types to domain records.

use std::str::FromStr;

use orderdesk_core::{
    LineItem, NO_COLLECTION, NO_SUB_BRAND, OrderPage, OrderRecord, ShippingLine, format_address,
    format_customer_name,
};
use rust_decimal::Decimal;

use super::ShopifyError;
use super::queries::get_orders;

pub fn convert_order_connection(
    connection: get_orders::GetOrdersOrders,
) -> Result<OrderPage, ShopifyError> {
    let orders = connection
        .edges
        .into_iter()
        .map(|e| convert_order(e.node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderPage {
        orders,
        end_cursor: connection.page_info.end_cursor,
        has_next_page: connection.page_info.has_next_page,
    })
}

pub fn convert_order(node: get_orders::GetOrdersOrdersNode) -> Result<OrderRecord, ShopifyError> {
    let money = node.current_total_price_set.shop_money;
    let customer = node.customer;

    Ok(OrderRecord {
        order_id: node.name,
        created_at: node.created_at,
        financial_status: node.display_financial_status.unwrap_or_default(),
        fulfillment_status: node.display_fulfillment_status.unwrap_or_default(),
        total: parse_amount(&money.amount)?,
        currency: money.currency_code,
        customer_name: customer.as_ref().map_or_else(String::new, |c| {
            format_customer_name(c.first_name.as_deref(), c.last_name.as_deref())
        }),
        customer_email: customer
            .as_ref()
            .and_then(|c| c.email.clone())
            .unwrap_or_default(),
        customer_address: convert_address(
            customer.as_ref().and_then(|c| c.default_address.as_ref()),
        ),
        shipping_address: convert_address(node.shipping_address.as_ref()),
        billing_address: convert_address(node.billing_address.as_ref()),
        shipping_line: node.shipping_line.map(convert_shipping_line).transpose()?,
        line_items: node
            .line_items
            .edges
            .into_iter()
            .map(|e| convert_line_item(e.node))
            .collect(),
    })
}

fn convert_address(address: Option<&get_orders::MailingAddress>) -> String {
    address.map_or_else(String::new, |a| {
        format_address(
            a.address1.as_deref(),
            a.city.as_deref(),
            a.country.as_deref(),
        )
    })
}

fn convert_shipping_line(line: get_orders::ShippingLine) -> Result<ShippingLine, ShopifyError> {
    let money = line.original_price_set.shop_money;
    Ok(ShippingLine {
        title: line.title,
        price: parse_amount(&money.amount)?,
        currency: money.currency_code,
    })
}

fn convert_line_item(item: get_orders::LineItem) -> LineItem {
    let (collection, sub_brand) = item.product.map_or((None, None), |p| {
        (
            p.collections.edges.into_iter().next().map(|e| e.node.title),
            p.metafield.map(|m| m.value),
        )
    });

    LineItem {
        title: item.title,
        quantity: item.quantity,
        collection: collection.unwrap_or_else(|| NO_COLLECTION.to_string()),
        sub_brand: sub_brand.unwrap_or_else(|| NO_SUB_BRAND.to_string()),
    }
}

fn parse_amount(amount: &str) -> Result<Decimal, ShopifyError> {
    Decimal::from_str(amount).map_err(|_| ShopifyError::InvalidAmount(amount.to_string()))
}
