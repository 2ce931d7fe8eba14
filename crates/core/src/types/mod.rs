//! Core types for orderdesk.
//!
//! This module provides the normalized domain model shared by the server
//! and its clients.

pub mod filter;
pub mod job;
pub mod order;
pub mod status;
pub mod summary;

pub use filter::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, FilterError, FilterParams, MAX_PAGE_SIZE, OrderFilters,
    OrderSortKey, non_blank,
};
pub use job::{DEFAULT_SAMPLE_CAP, JobId, JobSnapshot, JobStatus, JobTransitionError};
pub use order::{
    LineItem, NO_COLLECTION, NO_SUB_BRAND, OrderPage, OrderRecord, ShippingLine, format_address,
    format_customer_name,
};
pub use status::{FinancialStatus, FulfillmentStatus};
pub use summary::OrderSummary;
