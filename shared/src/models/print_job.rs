//! Print Job Model

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Product label printed when the server does not send one
pub const DEFAULT_PRODUCT_NAME: &str = "CUBE COFFEE";

/// Pending print job as delivered by the receipt queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: String,
    pub transaction_hash: String,
    /// Integer amount in wei, decimal or `0x`-prefixed hex. A JSON number is
    /// kept as its decimal text.
    #[serde(rename = "amount", deserialize_with = "amount_text")]
    pub amount_raw: String,
    pub token: String,
    pub from_address: String,
    pub to_address: String,
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl PrintJob {
    /// Product name to print, falling back to [`DEFAULT_PRODUCT_NAME`]
    pub fn product_name(&self) -> &str {
        match self.product_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_PRODUCT_NAME,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

fn amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Text(s) => s,
        RawAmount::Number(n) => n.to_string(),
    })
}

/// Print job status as reported to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Printing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Printing => "printing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and Failed are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Pending → Printing → {Completed | Failed}
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Printing)
                | (JobStatus::Printing, JobStatus::Completed)
                | (JobStatus::Printing, JobStatus::Failed)
        )
    }

    /// Move to `next`, rejecting anything outside the transition rule
    pub fn transition(self, next: JobStatus) -> Result<JobStatus, StatusTransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusTransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Illegal status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Illegal job status transition: {from} -> {to}")]
pub struct StatusTransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_job_deserialize() {
        let json = r#"{
            "id": "p-1",
            "transactionHash": "0xabc",
            "amount": "4500000000000000000",
            "token": "0xdac17f958d2ee523a2206206994597c13d831ec7",
            "fromAddress": "0x01",
            "toAddress": "0x02",
            "timestamp": "2025-01-01T00:00:00.000Z",
            "extra": 42
        }"#;

        let job: PrintJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, "p-1");
        assert_eq!(job.amount_raw, "4500000000000000000");
        assert_eq!(job.product_name, None);
        assert_eq!(job.product_name(), DEFAULT_PRODUCT_NAME);
    }

    #[test]
    fn test_numeric_amount_is_accepted() {
        let json = r#"{"id":"1","transactionHash":"h","amount":4500000000000000000,"token":"t",
            "fromAddress":"a","toAddress":"b","timestamp":"x"}"#;
        let job: PrintJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.amount_raw, "4500000000000000000");

        let json = r#"{"id":"2","transactionHash":"h","amount":-5,"token":"t",
            "fromAddress":"a","toAddress":"b","timestamp":"x"}"#;
        let job: PrintJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.amount_raw, "-5");
    }

    #[test]
    fn test_amount_of_wrong_type_is_rejected() {
        let json = r#"{"id":"1","transactionHash":"h","amount":true,"token":"t",
            "fromAddress":"a","toAddress":"b","timestamp":"x"}"#;
        assert!(serde_json::from_str::<PrintJob>(json).is_err());
    }

    #[test]
    fn test_blank_product_name_uses_default() {
        let json = r#"{"id":"1","transactionHash":"h","amount":"0","token":"t",
            "fromAddress":"a","toAddress":"b","timestamp":"x","productName":"  "}"#;
        let job: PrintJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.product_name(), DEFAULT_PRODUCT_NAME);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Printing).unwrap(),
            "\"printing\""
        );
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_status_transitions() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Printing));
        assert!(JobStatus::Printing.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Printing.can_transition_to(JobStatus::Failed));

        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Completed));

        let err = JobStatus::Pending
            .transition(JobStatus::Completed)
            .unwrap_err();
        assert_eq!(err.from, JobStatus::Pending);
        assert_eq!(err.to, JobStatus::Completed);
    }
}
