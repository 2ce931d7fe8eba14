//! Waiting for an export job to finish.

use std::future::Future;
use std::time::Duration;

use orderdesk_core::{JobId, JobSnapshot, JobStatus};
use thiserror::Error;

use super::JobRegistry;

/// Errors while waiting for a job.
#[derive(Debug, Error)]
pub enum PollError {
    /// The job id is unknown (never existed, or already swept).
    #[error("Batch not found")]
    NotFound(JobId),

    /// The job finished in the failed state.
    #[error("{0}")]
    Failed(String),

    /// The status could not be read.
    #[error("Status request failed: {0}")]
    Source(String),
}

/// Something that can report a job's current snapshot.
///
/// Implemented by the in-process [`JobRegistry`] and by HTTP clients that
/// query the status endpoint.
pub trait JobStatusSource: Send + Sync {
    /// Current snapshot, or `None` if the job is unknown.
    fn job_status(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<Option<JobSnapshot>, PollError>> + Send;
}

impl JobStatusSource for JobRegistry {
    async fn job_status(&self, job_id: JobId) -> Result<Option<JobSnapshot>, PollError> {
        Ok(self.get_job(job_id).await)
    }
}

/// Polls a job at a fixed interval until it is terminal.
///
/// Stopping early is done by dropping the future returned from
/// [`wait`](Self::wait).
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

impl StatusPoller {
    /// Default delay between status checks.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for `job_id` to complete.
    ///
    /// Checks once per interval, starting one interval from now, and calls
    /// `on_update` with every snapshot it reads. A completed snapshot is
    /// returned with its sample records in `data`.
    ///
    /// # Errors
    ///
    /// Returns `PollError::NotFound` if the job is unknown,
    /// `PollError::Failed` with the job's error message if it failed, and
    /// `PollError::Source` if a status check itself fails.
    pub async fn wait<S, F>(
        &self,
        source: &S,
        job_id: JobId,
        mut on_update: F,
    ) -> Result<JobSnapshot, PollError>
    where
        S: JobStatusSource + ?Sized,
        F: FnMut(&JobSnapshot) + Send,
    {
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.interval,
            self.interval,
        );
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(job) = source.job_status(job_id).await? else {
                return Err(PollError::NotFound(job_id));
            };
            on_update(&job);

            match job.status {
                JobStatus::Processing => {
                    tracing::debug!(%job_id, processed = job.processed, "Job still processing");
                }
                JobStatus::Completed => return Ok(job),
                JobStatus::Failed => {
                    return Err(PollError::Failed(
                        job.error.unwrap_or_else(|| "Batch failed".to_string()),
                    ));
                }
            }
        }
    }
}
