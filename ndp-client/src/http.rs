//! HTTP client for the receipt queue API

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use shared::{JobStatus, QueueItem, QueueResponse, StatusReport};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const QUEUE_PATH: &str = "api/receipt/queue";
pub const STATUS_PATH: &str = "api/receipt/status";
pub const STATS_PATH: &str = "api/receipt/stats";

/// Header that tells tunnelling proxies (ngrok) to skip their browser
/// warning interstitial and pass the request through.
pub const BYPASS_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Receipt queue operations used by the polling worker
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Fetch the items currently pending on the server, in server order.
    /// Items are decoded one by one; a bad item does not fail the fetch.
    async fn fetch_pending(&self) -> ClientResult<Vec<QueueItem>>;

    /// Report a job status change
    async fn report_status(
        &self,
        job_id: &str,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> ClientResult<()>;

    /// Connectivity probe: any 200 from the stats endpoint counts as connected
    async fn probe(&self) -> bool;
}

/// Network queue client
#[derive(Debug, Clone)]
pub struct QueueClient {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl QueueClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(BYPASS_WARNING_HEADER, HeaderValue::from_static("true"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn non-2xx responses into [`ClientError::Server`]
    async fn check_status(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Server {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl QueueApi for QueueClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_pending(&self) -> ClientResult<Vec<QueueItem>> {
        let response = self.client.get(self.url(QUEUE_PATH)).send().await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        let queue: QueueResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("queue response: {}", e)))?;

        if !queue.is_success() {
            warn!(status = %queue.status, "Queue endpoint reported non-success status");
        }
        debug!(pending = queue.pending_items, "Queue fetched");
        let items = queue.into_items();
        for item in &items {
            if let QueueItem::Invalid { id, reason } = item {
                warn!(id = ?id, reason = %reason, "Undecodable queue item");
            }
        }
        Ok(items)
    }

    #[instrument(skip(self, error_message))]
    async fn report_status(
        &self,
        job_id: &str,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> ClientResult<()> {
        let mut report = StatusReport::new(job_id, status);
        if let Some(message) = error_message {
            report = report.with_error(message);
        }

        let response = self
            .client
            .post(self.url(STATUS_PATH))
            .json(&report)
            .send()
            .await?;
        Self::check_status(response).await?;

        debug!("Status reported");
        Ok(())
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn probe(&self) -> bool {
        let result = self
            .client
            .get(self.url(STATS_PATH))
            .timeout(self.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Server probe failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Server unreachable");
                false
            }
        }
    }
}
