//! Order Desk server library.
//!
//! Shopify order reporting: JSON listing, summary statistics, CSV export and
//! background export jobs. Exposed as a library so the binary, the CLI and
//! the integration tests share one implementation.
//!
//! # Security
//!
//! This crate holds a Shopify Admin API access token (HIGH PRIVILEGE) and
//! has no authentication of its own. Only expose it on a private network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod routes;
pub mod shopify;
pub mod state;
