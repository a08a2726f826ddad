//! # ndp-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building from receipt fragments
//! - Per-receipt text encoding with a fixed fallback chain
//! - Display-width helpers for column layout
//! - Network (raw TCP) and device-file print sinks
//!
//! Business logic (WHAT to print) stays in application code:
//! - Receipt layout and amount formatting → ndp-agent
//!
//! ## Example
//!
//! ```ignore
//! use ndp_printer::{Fragment, Font, ConfiguredPrinter, PrintSink, ProtocolBuilder};
//!
//! let fragments = vec![
//!     Fragment::SetFont(Font::Bold),
//!     Fragment::text("결제 영수증"),
//!     Fragment::LineFeed,
//!     Fragment::Separator,
//! ];
//! let data = ProtocolBuilder::new(40).build(&fragments);
//!
//! let mut printer = ConfiguredPrinter::from_target("/dev/ttyS4")?;
//! printer.set_buffer(data);
//! printer.print().await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use encoding::{
    Encoded, EncodingChoice, char_width, display_width, encode, encode_bytes, encode_with,
    select_encoding, truncate_display,
};
pub use error::{PrintError, PrintResult};
pub use escpos::{Align, EscPosBuilder, Font, Fragment, ProtocolBuilder, hex_dump};
pub use printer::{
    ConfiguredPrinter, DEFAULT_WRITE_TIMEOUT, DevicePrinter, NetworkPrinter, PrintSink,
};
