//! `batch` commands: start a background export and follow it.

use orderdesk_core::{JobId, JobStatus};
use orderdesk_server::export::StatusPoller;

use crate::client::{ApiClient, BatchParams};

use super::{CommandError, FilterArgs, print_json};

/// Start a background export job, optionally waiting for it to finish.
///
/// Ctrl+C while waiting stops polling only; the job keeps running on the
/// server and can be checked later with `batch status`.
pub async fn start(
    client: &ApiClient,
    filters: FilterArgs,
    batch_size: Option<u32>,
    max_batches: Option<u32>,
    wait: bool,
    poller: StatusPoller,
) -> Result<(), CommandError> {
    let params = BatchParams {
        batch_size,
        max_batches,
        filters: filters.into(),
    };

    let started = client.start_batch(&params).await?;
    tracing::info!(
        batch_id = %started.batch_id,
        estimated_time = %started.estimated_time,
        "{}",
        started.message
    );

    if !wait {
        return print_json(&serde_json::json!({
            "batchId": started.batch_id,
            "estimatedTime": started.estimated_time,
            "status_endpoint": started.status_endpoint,
        }));
    }

    let waited = tokio::select! {
        result = poller.wait(client, started.batch_id, |job| {
            tracing::info!(status = %job.status, processed = job.processed, "Batch status");
        }) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match waited {
        Some(result) => {
            let job = result?;
            if let Some(partial) = &job.partial_error {
                tracing::warn!(error = %partial, "Batch stopped early; results are partial");
            }
            print_json(&serde_json::to_value(&job)?)
        }
        None => {
            tracing::info!(
                batch_id = %started.batch_id,
                "Stopped polling; the batch continues on the server"
            );
            Ok(())
        }
    }
}

/// Print the current state of a job.
pub async fn status(client: &ApiClient, batch_id: &str) -> Result<(), CommandError> {
    let job_id: JobId = batch_id
        .parse()
        .map_err(|_| CommandError::InvalidBatchId(batch_id.to_string()))?;

    let Some(job) = client.batch_status(job_id).await? else {
        return Err(orderdesk_server::export::PollError::NotFound(job_id).into());
    };

    if job.status == JobStatus::Failed {
        tracing::error!(error = job.error.as_deref().unwrap_or_default(), "Batch failed");
    }
    print_json(&serde_json::to_value(&job)?)
}
