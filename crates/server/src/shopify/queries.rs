//! GraphQL query definitions for the Shopify Admin API.
//!
//! Queries implement `graphql_client::GraphQLQuery` so the client can execute
//! them generically. Response modules mirror the layout `graphql_client`
//! generates: one module per query holding `Variables` and `ResponseData`.

use graphql_client::{GraphQLQuery, QueryBody};

/// Page through orders with customer, address, shipping and line item data.
pub struct GetOrders;

impl GraphQLQuery for GetOrders {
    type Variables = get_orders::Variables;
    type ResponseData = get_orders::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_orders::QUERY,
            operation_name: get_orders::OPERATION_NAME,
        }
    }
}

pub mod get_orders {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetOrders";

    pub const QUERY: &str = r#"query GetOrders($first: Int!, $after: String, $query: String, $sortKey: OrderSortKeys, $reverse: Boolean) {
  orders(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        name
        createdAt
        displayFinancialStatus
        displayFulfillmentStatus
        currentTotalPriceSet {
          shopMoney {
            amount
            currencyCode
          }
        }
        customer {
          firstName
          lastName
          email
          defaultAddress {
            address1
            city
            country
          }
        }
        shippingAddress {
          address1
          city
          country
        }
        billingAddress {
          address1
          city
          country
        }
        shippingLine {
          title
          originalPriceSet {
            shopMoney {
              amount
              currencyCode
            }
          }
        }
        lineItems(first: 10) {
          edges {
            node {
              title
              quantity
              product {
                collections(first: 1) {
                  edges {
                    node {
                      title
                    }
                  }
                }
                metafield(namespace: "custom", key: "sub_brand") {
                  value
                }
              }
            }
          }
        }
      }
    }
  }
}"#;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub after: Option<String>,
        pub query: Option<String>,
        pub sort_key: Option<String>,
        pub reverse: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub orders: GetOrdersOrders,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GetOrdersOrders {
        pub page_info: PageInfo,
        pub edges: Vec<Edge<GetOrdersOrdersNode>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageInfo {
        pub has_next_page: bool,
        pub end_cursor: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Edge<T> {
        pub node: T,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(bound(deserialize = "T: Deserialize<'de>"))]
    pub struct Connection<T> {
        #[serde(default)]
        pub edges: Vec<Edge<T>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GetOrdersOrdersNode {
        pub id: String,
        pub name: String,
        pub created_at: String,
        pub display_financial_status: Option<String>,
        pub display_fulfillment_status: Option<String>,
        pub current_total_price_set: MoneyBag,
        pub customer: Option<Customer>,
        pub shipping_address: Option<MailingAddress>,
        pub billing_address: Option<MailingAddress>,
        pub shipping_line: Option<ShippingLine>,
        pub line_items: Connection<LineItem>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyBag {
        pub shop_money: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyV2 {
        pub amount: String,
        pub currency_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Customer {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: Option<String>,
        pub default_address: Option<MailingAddress>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MailingAddress {
        pub address1: Option<String>,
        pub city: Option<String>,
        pub country: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShippingLine {
        pub title: String,
        pub original_price_set: MoneyBag,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LineItem {
        pub title: String,
        pub quantity: i64,
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Product {
        pub collections: Connection<Collection>,
        pub metafield: Option<Metafield>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Collection {
        pub title: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Metafield {
        pub value: String,
    }
}
