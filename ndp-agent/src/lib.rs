//! NDP Agent - unattended payment receipt printer
//!
//! Polls the receipt queue server, renders each pending payment as an
//! ESC/POS receipt and reports the print outcome back.
//!
//! # Module Structure
//!
//! ```text
//! ndp-agent/
//! ├── core/       # Config, CLI commands
//! ├── printing/   # Amount formatting, receipt layout, polling worker
//! └── utils/      # Logger
//! ```

pub mod core;
pub mod printing;
pub mod utils;

pub use self::core::{Command, Config};
pub use printing::{
    CycleStats, PollingHandle, PollingWorker, ReceiptFormatter, ReceiptStyle, WorkerState,
};
pub use utils::init_logger_with_file;
