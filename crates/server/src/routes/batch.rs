//! Background export job handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use orderdesk_core::{FilterParams, JobId, JobSnapshot};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::AppError, export::estimated_time, extract::ApiJson, state::AppState};

/// Default orders per page for batch jobs.
pub const DEFAULT_BATCH_SIZE: u32 = 100;

/// Default page ceiling for batch jobs.
pub const DEFAULT_MAX_BATCHES: u32 = 50;

/// `POST /api/orders/batch` request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub max_batches: Option<u32>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

/// `POST /api/orders/batch` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStarted {
    pub success: bool,
    pub batch_id: JobId,
    pub message: String,
    pub estimated_time: String,
    #[serde(rename = "status_endpoint")]
    pub status_endpoint: String,
}

/// `GET /api/orders/batch/{batchId}/status` response body.
#[derive(Debug, Serialize)]
pub struct BatchStatus {
    pub success: bool,
    #[serde(flatten)]
    pub job: JobSnapshot,
}

/// Path of the status endpoint for `job_id`.
#[must_use]
pub fn status_endpoint(job_id: JobId) -> String {
    format!("/api/orders/batch/{job_id}/status")
}

/// Start a background export job.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BatchRequest>,
) -> Result<Json<BatchStarted>, AppError> {
    let filters = request
        .filters
        .into_filters()?
        .with_page_size(request.batch_size.unwrap_or(DEFAULT_BATCH_SIZE))
        .with_max_pages(request.max_batches.unwrap_or(DEFAULT_MAX_BATCHES));
    let max_pages = filters.max_pages;

    let job_id = state
        .jobs()
        .create_job(state.shopify().clone(), filters, state.job_options())
        .await;

    Ok(Json(BatchStarted {
        success: true,
        batch_id: job_id,
        message: "Batch processing started".to_string(),
        estimated_time: estimated_time(max_pages),
        status_endpoint: status_endpoint(job_id),
    }))
}

/// Current state of a background export job.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchStatus>, AppError> {
    let not_found = || AppError::NotFound("Batch not found".to_string());

    let job_id: JobId = batch_id.parse().map_err(|_| not_found())?;
    let job = state.jobs().get_job(job_id).await.ok_or_else(not_found)?;

    Ok(Json(BatchStatus { success: true, job }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_defaults() {
        let request: BatchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.batch_size.is_none());
        assert!(request.max_batches.is_none());
        assert_eq!(request.filters, FilterParams::default());
    }

    #[test]
    fn test_batch_request_with_filters() {
        let request: BatchRequest = serde_json::from_str(
            r#"{"batchSize": 25, "maxBatches": 4, "financialStatus": "paid", "createdAtMin": "2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(request.batch_size, Some(25));
        assert_eq!(request.max_batches, Some(4));
        assert_eq!(request.filters.financial_status.as_deref(), Some("paid"));
        assert_eq!(request.filters.created_at_min.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_status_endpoint() {
        let id = JobId::new();
        assert_eq!(status_endpoint(id), format!("/api/orders/batch/{id}/status"));
    }

    #[test]
    fn test_batch_started_wire_format() {
        let id = JobId::new();
        let json = serde_json::to_value(BatchStarted {
            success: true,
            batch_id: id,
            message: "Batch processing started".to_string(),
            estimated_time: estimated_time(50),
            status_endpoint: status_endpoint(id),
        })
        .unwrap();

        assert_eq!(json["batchId"], id.to_string());
        assert_eq!(json["estimatedTime"], "100 seconds");
        assert!(json["status_endpoint"].as_str().unwrap().ends_with("/status"));
    }
}
