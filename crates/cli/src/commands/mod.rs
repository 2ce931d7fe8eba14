//! Subcommand implementations.

pub mod batch;
pub mod orders;

use std::io::Write;

use clap::Args;
use orderdesk_core::FilterParams;

use crate::client::ClientError;

/// Errors surfaced by any subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Poll(#[from] orderdesk_server::export::PollError),

    #[error("Invalid batch id: {0}")]
    InvalidBatchId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Order filters shared by `orders`, `export` and `batch start`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only orders created at or after this date (ISO 8601)
    #[arg(long)]
    pub created_at_min: Option<String>,

    /// Only orders created at or before this date (ISO 8601)
    #[arg(long)]
    pub created_at_max: Option<String>,

    /// Financial status (pending, authorized, paid, refunded, ...)
    #[arg(long)]
    pub financial_status: Option<String>,

    /// Fulfillment status (unfulfilled, partial, fulfilled, restocked)
    #[arg(long)]
    pub fulfillment_status: Option<String>,

    /// Sort key (CREATED_AT, UPDATED_AT, ORDER_NUMBER, TOTAL_PRICE, ...)
    #[arg(long)]
    pub sort_key: Option<String>,

    /// Sort ascending instead of newest first
    #[arg(long)]
    pub ascending: bool,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        Self {
            created_at_min: args.created_at_min,
            created_at_max: args.created_at_max,
            financial_status: args.financial_status,
            fulfillment_status: args.fulfillment_status,
            sort_key: args.sort_key,
            reverse: args.ascending.then(|| "false".to_string()),
        }
    }
}

/// Write pretty-printed JSON to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_into_params() {
        let params: FilterParams = FilterArgs {
            financial_status: Some("paid".to_string()),
            ascending: true,
            ..FilterArgs::default()
        }
        .into();

        assert_eq!(params.financial_status.as_deref(), Some("paid"));
        assert_eq!(params.reverse.as_deref(), Some("false"));
        assert!(params.created_at_min.is_none());
    }

    #[test]
    fn test_descending_is_left_to_server_default() {
        let params: FilterParams = FilterArgs::default().into();
        assert!(params.reverse.is_none());
    }
}
