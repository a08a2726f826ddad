//! Data models
//!
//! Shared between ndp-client (wire decoding) and ndp-agent (printing).

pub mod print_job;

// Re-exports
pub use print_job::*;
