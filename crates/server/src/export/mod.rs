//! Order export pipeline.
//!
//! - [`OrderPageSource`]: one page of orders per call
//! - [`collect_orders`]: walks pages up to a ceiling
//! - [`JobRegistry`]: background export jobs and their snapshots
//! - [`StatusPoller`]: waits for a job to reach a terminal state
//! - [`render_csv`]: flattens orders into one row per line item

mod collector;
pub mod csv;
mod fetcher;
mod jobs;
mod poller;

pub use collector::{CollectError, CollectProgress, CollectedOrders, PROGRESS_EVERY, collect_orders};
pub use self::csv::{CSV_COLUMNS, CsvRow, ExportError, csv_filename, flatten_orders, render_csv};
pub use fetcher::OrderPageSource;
pub use jobs::{JobOptions, JobRegistry, estimated_time};
pub use poller::{JobStatusSource, PollError, StatusPoller};

use serde::{Deserialize, Serialize};

/// What a multi-page collection does when a page after the first fails.
///
/// A failure on the first page is always an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop and keep what was collected so far, recording the error.
    #[default]
    BestEffort,
    /// Discard everything and fail.
    FailFast,
}

impl FailurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestEffort => "best_effort",
            Self::FailFast => "fail_fast",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(Self::BestEffort),
            "fail_fast" => Ok(Self::FailFast),
            _ => Err(format!(
                "invalid failure policy: {s} (expected best_effort or fail_fast)"
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!(
            "best_effort".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::BestEffort
        );
        assert_eq!(
            "Fail-Fast".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::FailFast
        );
        assert!("sometimes".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_failure_policy_default() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::BestEffort);
    }
}
