//! Export job identity and lifecycle.
//!
//! A job moves through exactly one transition:
//!
//! ```text
//! processing ──► completed
//!      │
//!      └───────► failed
//! ```
//!
//! Once terminal, a [`JobSnapshot`] is never rewritten; the transition
//! methods refuse to move a terminal job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::order::OrderRecord;

/// Default number of records kept inline on a completed job.
pub const DEFAULT_SAMPLE_CAP: usize = 1000;

/// Unique export job identifier.
///
/// Backed by a UUID v7, so ids are timestamp-ordered and unique per creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Allocate a fresh job id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle status of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether no further transitions can occur.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Attempted to move a job that already reached a terminal state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("job {job_id} is already {status}")]
pub struct JobTransitionError {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Point-in-time view of an export job.
///
/// This is both the registry's stored value and the payload of the status
/// endpoint, so field names follow the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    #[serde(rename = "batchId")]
    pub job_id: JobId,
    pub status: JobStatus,
    pub processed: usize,
    pub total: usize,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why a completed run stopped before the last page, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_error: Option<String>,
    /// Leading sample of the collected records (completed jobs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<OrderRecord>>,
}

impl JobSnapshot {
    /// A freshly created job with zero counts.
    #[must_use]
    pub const fn processing(job_id: JobId, start_time: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Processing,
            processed: 0,
            total: 0,
            start_time,
            completed_time: None,
            error: None,
            partial_error: None,
            data: None,
        }
    }

    /// Move to `completed`, keeping at most `sample_cap` records inline.
    ///
    /// `processed` and `total` reflect the full record count, not the sample.
    ///
    /// # Errors
    ///
    /// Returns `JobTransitionError` if the job is already terminal.
    pub fn complete(
        &self,
        mut orders: Vec<OrderRecord>,
        partial_error: Option<String>,
        sample_cap: usize,
        now: DateTime<Utc>,
    ) -> Result<Self, JobTransitionError> {
        self.ensure_processing()?;
        let count = orders.len();
        orders.truncate(sample_cap);
        Ok(Self {
            status: JobStatus::Completed,
            processed: count,
            total: count,
            completed_time: Some(now),
            partial_error,
            data: Some(orders),
            ..self.clone()
        })
    }

    /// Move to `failed`, preserving the error message verbatim.
    ///
    /// # Errors
    ///
    /// Returns `JobTransitionError` if the job is already terminal.
    pub fn fail(&self, message: String, now: DateTime<Utc>) -> Result<Self, JobTransitionError> {
        self.ensure_processing()?;
        Ok(Self {
            status: JobStatus::Failed,
            processed: 0,
            total: 0,
            completed_time: Some(now),
            error: Some(message),
            ..self.clone()
        })
    }

    /// Whether this job is terminal and finished before `cutoff`.
    #[must_use]
    pub fn expired_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.status.is_terminal() && self.completed_time.is_some_and(|t| t < cutoff)
    }

    const fn ensure_processing(&self) -> Result<(), JobTransitionError> {
        if self.status.is_terminal() {
            return Err(JobTransitionError {
                job_id: self.job_id,
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn order(n: usize) -> OrderRecord {
        OrderRecord {
            order_id: format!("#{n}"),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            financial_status: "PAID".to_string(),
            fulfillment_status: "FULFILLED".to_string(),
            total: Decimal::ONE,
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

    #[test]
    fn test_job_ids_are_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<JobId>().unwrap(), a);
    }

    #[test]
    fn test_complete_truncates_sample_but_counts_everything() {
        let job = JobSnapshot::processing(JobId::new(), Utc::now());
        let orders: Vec<_> = (0..5).map(order).collect();

        let done = job.complete(orders, None, 3, Utc::now()).unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.processed, 5);
        assert_eq!(done.total, 5);
        assert_eq!(done.data.as_ref().unwrap().len(), 3);
        assert_eq!(done.data.unwrap()[0].order_id, "#0");
        assert!(done.completed_time.is_some());
    }

    #[test]
    fn test_fail_keeps_counts_at_zero() {
        let job = JobSnapshot::processing(JobId::new(), Utc::now());
        let failed = job.fail("HTTP error: 500".to_string(), Utc::now()).unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.processed, 0);
        assert_eq!(failed.total, 0);
        assert_eq!(failed.error.as_deref(), Some("HTTP error: 500"));
        assert!(failed.data.is_none());
    }

    #[test]
    fn test_terminal_jobs_cannot_transition() {
        let job = JobSnapshot::processing(JobId::new(), Utc::now());
        let done = job.complete(vec![], None, 10, Utc::now()).unwrap();

        let err = done.fail("late".to_string(), Utc::now()).unwrap_err();
        assert_eq!(err.status, JobStatus::Completed);
        assert!(done.complete(vec![order(1)], None, 10, Utc::now()).is_err());
    }

    #[test]
    fn test_expired_before_ignores_processing_jobs() {
        let start = Utc::now() - chrono::Duration::hours(2);
        let job = JobSnapshot::processing(JobId::new(), start);
        assert!(!job.expired_before(Utc::now()));

        let done = job.complete(vec![], None, 10, start).unwrap();
        assert!(done.expired_before(Utc::now()));
        assert!(!done.expired_before(start - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_snapshot_wire_format() {
        let job = JobSnapshot::processing(JobId::new(), Utc::now());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["batchId"], job.job_id.to_string());
        assert!(json.get("startTime").is_some());
        assert!(json.get("completedTime").is_none());
        assert!(json.get("data").is_none());
    }
}
