//! orderdesk core - shared domain types.
//!
//! This crate provides the types used across all orderdesk components:
//! - `server` - HTTP service, upstream client and export jobs
//! - `cli` - Command-line client for the server
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Order records, filter sets, job state and summary figures

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
