//! ESC/POS command building
//!
//! Two layers:
//! - [`EscPosBuilder`]: fluent byte writer for individual ESC/POS commands
//! - [`ProtocolBuilder`]: turns a receipt's [`Fragment`] list into the full
//!   device command stream (init, codepage, body, cut)

use crate::encoding::{self, EncodingChoice};
use tracing::{debug, instrument};

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Print mode (ESC ! n)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Normal,
    Bold,
    /// Emphasized, double height and double width
    BoldLarge,
}

/// One receipt layout instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    SetAlign(Align),
    SetFont(Font),
    Text(String),
    LineFeed,
    /// Full-width horizontal rule followed by a line feed
    Separator,
}

impl Fragment {
    pub fn text(s: impl Into<String>) -> Self {
        Fragment::Text(s.into())
    }
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers. After
/// [`EscPosBuilder::codepage`], text is written in that encoding; before it,
/// each call picks its own with [`encoding::encode`].
pub struct EscPosBuilder {
    buf: Vec<u8>,
    encoding: Option<EncodingChoice>,
}

impl EscPosBuilder {
    /// Create a new builder, starting with the printer reset (ESC @)
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self {
            buf,
            encoding: None,
        }
    }

    // === Setup ===

    /// Select character code table (ESC t n)
    pub fn codepage(&mut self, choice: EncodingChoice) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x74, choice.codepage()]);
        self.encoding = Some(choice);
        self
    }

    // === Text Output ===

    /// Write encoded text
    pub fn text(&mut self, s: &str) -> &mut Self {
        match self.encoding {
            Some(choice) => self.buf.extend_from_slice(&encoding::encode_with(s, choice)),
            None => self.buf.extend_from_slice(&encoding::encode_bytes(s)),
        }
        self
    }

    /// Write a line feed (LF)
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(0x0A);
        self
    }

    // === Alignment ===

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    // === Text Style ===

    /// Select print mode (ESC ! n)
    pub fn font(&mut self, font: Font) -> &mut Self {
        let mode = match font {
            Font::Normal => 0x00,
            Font::Bold => 0x08,
            Font::BoldLarge => 0x38,
        };
        self.buf.extend_from_slice(&[0x1B, 0x21, mode]);
        self
    }

    // === Paper Control ===

    /// Feed and full cut (GS V 66 1)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, 0x01]);
        self
    }

    // === Build ===

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Device command stream builder
///
/// Stateless: every call to [`ProtocolBuilder::build`] starts from an empty
/// buffer.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolBuilder {
    width: usize,
}

impl ProtocolBuilder {
    /// Create a builder for a paper width in display columns
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Horizontal rule spanning the full paper width
    pub fn separator_rule(&self) -> String {
        "-".repeat(self.width)
    }

    /// Encoding the codepage command is chosen for: whatever the receipt's
    /// combined text needs.
    pub fn receipt_encoding(&self, fragments: &[Fragment]) -> EncodingChoice {
        let text: String = fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        encoding::select_encoding(&text)
    }

    /// Build the full command stream:
    /// ESC @, ESC t n, fragments, GS V 66 1
    #[instrument(skip(self, fragments), fields(fragments = fragments.len()))]
    pub fn build(&self, fragments: &[Fragment]) -> Vec<u8> {
        let choice = self.receipt_encoding(fragments);

        let mut b = EscPosBuilder::new();
        b.codepage(choice);

        for fragment in fragments {
            match fragment {
                Fragment::SetAlign(Align::Left) => b.left(),
                Fragment::SetAlign(Align::Center) => b.center(),
                Fragment::SetFont(font) => b.font(*font),
                Fragment::Text(s) => {
                    let own = encoding::select_encoding(s);
                    if own != choice {
                        debug!(
                            fragment = own.name(),
                            receipt = choice.name(),
                            "fragment written in receipt encoding"
                        );
                    }
                    b.text(s)
                }
                Fragment::LineFeed => b.newline(),
                Fragment::Separator => b.text(&self.separator_rule()).newline(),
            };
        }

        b.cut();
        let data = b.build();
        debug!(encoding = choice.name(), bytes = data.len(), "command buffer built");
        data
    }
}

/// Space-separated upper-case hex of a buffer, for logs and debugging
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(1)
        .map(hex::encode_upper)
        .collect::<Vec<_>>()
        .join(" ")
}
