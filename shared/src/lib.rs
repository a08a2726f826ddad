//! Shared types for the NDP receipt printer
//!
//! Data model and wire types used by both the queue client and the
//! printing agent.

pub mod client;
pub mod models;

// Re-exports
pub use client::{QueueItem, QueueResponse, StatusReport};
pub use models::{JobStatus, PrintJob, StatusTransitionError};
pub use serde::{Deserialize, Serialize};
