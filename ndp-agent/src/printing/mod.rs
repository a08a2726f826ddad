//! Receipt printing
//!
//! - [`amount`]: wei → token quantity
//! - [`renderer`]: receipt layout and command stream
//! - [`worker`]: queue polling and status reporting

pub mod amount;
pub mod renderer;
pub mod worker;

pub use renderer::{ReceiptFormatter, ReceiptStyle};
pub use worker::{CycleStats, PollingHandle, PollingWorker, WorkerState};
