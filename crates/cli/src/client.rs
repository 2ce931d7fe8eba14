//! HTTP client for the Order Desk server API.

use orderdesk_core::{FilterParams, JobId, JobSnapshot};
use orderdesk_server::export::{JobStatusSource, PollError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors talking to the server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error payload.
    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Error body returned by every API route.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Query string for the order endpoints.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

/// `POST /api/orders/batch` body.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_batches: Option<u32>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

/// `POST /api/orders/batch` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStarted {
    pub batch_id: JobId,
    pub message: String,
    pub estimated_time: String,
    #[serde(rename = "status_endpoint")]
    pub status_endpoint: String,
}

/// A downloaded CSV export.
#[derive(Debug)]
pub struct CsvDownload {
    /// Filename suggested by the server, if any.
    pub filename: Option<String>,
    pub body: String,
}

/// Client for one Order Desk server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    /// `GET /health` as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server reports an error.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.http.get(self.url("/health")?).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /api/orders` as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server reports an error.
    pub async fn orders(&self, params: &OrdersParams) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .get(self.url("/api/orders")?)
            .query(params)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /api/orders/csv`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server reports an error.
    pub async fn export_csv(&self, params: &OrdersParams) -> Result<CsvDownload, ClientError> {
        let response = self
            .http
            .get(self.url("/api/orders/csv")?)
            .query(params)
            .send()
            .await?;
        let response = check(response).await?;

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);

        Ok(CsvDownload {
            filename,
            body: response.text().await?,
        })
    }

    /// `POST /api/orders/batch`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server reports an error.
    pub async fn start_batch(&self, params: &BatchParams) -> Result<BatchStarted, ClientError> {
        let response = self
            .http
            .post(self.url("/api/orders/batch")?)
            .json(params)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /api/orders/batch/{id}/status`; `None` when the job is unknown.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the server reports an error.
    pub async fn batch_status(&self, job_id: JobId) -> Result<Option<JobSnapshot>, ClientError> {
        let url = self.url(&format!("/api/orders/batch/{job_id}/status"))?;
        let response = self.http.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(check(response).await?.json().await?))
    }
}

impl JobStatusSource for ApiClient {
    async fn job_status(&self, job_id: JobId) -> Result<Option<JobSnapshot>, PollError> {
        self.batch_status(job_id)
            .await
            .map_err(|e| PollError::Source(e.to_string()))
    }
}

/// Turn a non-success response into `ClientError::Api`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text).map_or(text, |body| body.error);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Extract `filename` from a `Content-Disposition` header value.
fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=orders-2024.csv").as_deref(),
            Some("orders-2024.csv")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=\"quoted.csv\"").as_deref(),
            Some("quoted.csv")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_batch_params_wire_format() {
        let params = BatchParams {
            batch_size: Some(25),
            max_batches: None,
            filters: FilterParams {
                financial_status: Some("paid".to_string()),
                ..FilterParams::default()
            },
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["batchSize"], 25);
        assert_eq!(json["financialStatus"], "paid");
        assert!(json.get("maxBatches").is_none());
    }

    #[test]
    fn test_url_join() {
        let client = ApiClient::new(Url::parse("http://127.0.0.1:5000").unwrap());
        assert_eq!(
            client.url("/api/orders").unwrap().as_str(),
            "http://127.0.0.1:5000/api/orders"
        );
    }
}
