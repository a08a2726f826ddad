//! NDP Client - HTTP client for the receipt queue server
//!
//! Fetches pending print jobs and reports their status back.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{QueueApi, QueueClient};

// Re-export shared types for convenience
pub use shared::{JobStatus, PrintJob, QueueItem};
