//! Background export jobs.
//!
//! Jobs live in memory only; a restart forgets them. Each job is written
//! exactly twice: once when created (`processing`) and once when its
//! collection finishes (`completed` or `failed`).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use orderdesk_core::{DEFAULT_SAMPLE_CAP, JobId, JobSnapshot, JobTransitionError, OrderFilters};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::{FailurePolicy, OrderPageSource, collect_orders};

/// Per-job settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    /// Records kept inline on the completed snapshot.
    pub sample_cap: usize,
    /// Behaviour when a page after the first fails.
    pub policy: FailurePolicy,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
            policy: FailurePolicy::default(),
        }
    }
}

/// Human-readable duration estimate for a job with `max_pages` pages.
///
/// Assumes roughly two seconds per page.
#[must_use]
pub fn estimated_time(max_pages: u32) -> String {
    format!("{} seconds", u64::from(max_pages) * 2)
}

/// In-memory registry of export jobs.
///
/// Cheap to clone; clones share the same jobs.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, JobSnapshot>>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job and start collecting in the background.
    ///
    /// Returns as soon as the job is registered as `processing`; the id is
    /// immediately queryable through [`get_job`](Self::get_job).
    pub async fn create_job<S>(&self, source: S, filters: OrderFilters, options: JobOptions) -> JobId
    where
        S: OrderPageSource + 'static,
    {
        let job_id = JobId::new();
        let snapshot = JobSnapshot::processing(job_id, Utc::now());
        self.jobs.write().await.insert(job_id, snapshot);

        tracing::info!(
            %job_id,
            page_size = filters.page_size,
            max_pages = filters.max_pages,
            record_bound = filters.record_bound(),
            policy = %options.policy,
            "Export job started"
        );

        let registry = self.clone();
        let span = tracing::info_span!("export_job", %job_id);
        tokio::spawn(
            async move {
                registry.run(job_id, source, filters, options).await;
            }
            .instrument(span),
        );

        job_id
    }

    /// Current snapshot of a job, if it exists.
    pub async fn get_job(&self, job_id: JobId) -> Option<JobSnapshot> {
        self.jobs.read().await.get(&job_id).cloned()
    }

    /// Number of jobs currently held.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether the registry holds no jobs.
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Drop terminal jobs that finished more than `retention` ago.
    ///
    /// Processing jobs are never removed. Returns how many jobs were dropped.
    pub async fn sweep_expired(&self, retention: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|r| Utc::now().checked_sub_signed(r))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.expired_before(cutoff));
        before - jobs.len()
    }

    /// Periodically sweep expired jobs until the returned task is aborted.
    #[must_use]
    pub fn spawn_sweeper(&self, retention: Duration, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = registry.sweep_expired(retention).await;
                if removed > 0 {
                    tracing::info!(removed, "Swept expired export jobs");
                }
            }
        })
    }

    async fn run<S>(&self, job_id: JobId, source: S, filters: OrderFilters, options: JobOptions)
    where
        S: OrderPageSource,
    {
        let result = collect_orders(&source, &filters, options.policy, |progress| {
            tracing::debug!(pages = progress.pages, records = progress.records, "Export job progress");
        })
        .await;

        let outcome = match result {
            Ok(collected) => {
                tracing::info!(
                    records = collected.orders.len(),
                    pages = collected.pages_fetched,
                    partial = collected.is_partial(),
                    "Export job completed"
                );
                self.finish(job_id, |job| {
                    job.complete(
                        collected.orders,
                        collected.partial_error,
                        options.sample_cap,
                        Utc::now(),
                    )
                })
                .await
            }
            Err(e) => {
                tracing::error!(error = %e, page = e.page, "Export job failed");
                let message = e.to_string();
                self.finish(job_id, |job| job.fail(message, Utc::now())).await
            }
        };

        if let Err(e) = outcome {
            tracing::warn!(error = %e, "Export job already finished; result discarded");
        }
    }

    /// Apply the terminal transition under one write lock.
    async fn finish<F>(&self, job_id: JobId, transition: F) -> Result<(), JobTransitionError>
    where
        F: FnOnce(&JobSnapshot) -> Result<JobSnapshot, JobTransitionError>,
    {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&job_id) else {
            tracing::warn!(%job_id, "Export job vanished before finishing");
            return Ok(());
        };
        *job = transition(job)?;
        Ok(())
    }
}
