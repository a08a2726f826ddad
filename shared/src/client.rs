//! Receipt queue API DTOs
//!
//! Request/response bodies exchanged with the receipt server.
//! These types are shared between ndp-client and ndp-agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{JobStatus, PrintJob};

// =============================================================================
// Queue API DTOs
// =============================================================================

/// `GET /api/receipt/queue` response
///
/// Items stay as raw JSON so one malformed entry cannot reject the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub status: String,
    #[serde(default)]
    pub pending_items: i64,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl QueueResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Items to process in server order; empty unless the server reported
    /// success with pending items
    pub fn into_items(self) -> Vec<QueueItem> {
        if self.is_success() && self.pending_items > 0 {
            self.items.into_iter().map(QueueItem::from_value).collect()
        } else {
            Vec::new()
        }
    }
}

/// One entry of the queue, decoded on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Job(PrintJob),
    /// Entry that does not decode as a job. `id` is kept when readable so the
    /// job can still be reported failed.
    Invalid { id: Option<String>, reason: String },
}

impl QueueItem {
    pub fn from_value(value: Value) -> Self {
        let id = match value.get("id") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        match serde_json::from_value::<PrintJob>(value) {
            Ok(job) => QueueItem::Job(job),
            Err(e) => QueueItem::Invalid {
                id,
                reason: format!("Invalid queue item: {}", e),
            },
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            QueueItem::Job(job) => Some(&job.id),
            QueueItem::Invalid { id, .. } => id.as_deref(),
        }
    }
}

impl From<PrintJob> for QueueItem {
    fn from(job: PrintJob) -> Self {
        QueueItem::Job(job)
    }
}

/// `POST /api/receipt/status` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub print_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusReport {
    pub fn new(print_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            print_id: print_id.into(),
            status,
            error_message: None,
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}
