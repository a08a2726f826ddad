//! Text encoding utilities for single-codepage thermal printers
//!
//! The printer accepts exactly one single-byte (or DBCS) codepage at a time
//! and has no notion of Unicode. A receipt's text is therefore encoded with
//! the first candidate that can represent all of it without loss:
//!
//! 1. EUC-KR (KS X 1001 / CP949 superset)
//! 2. Shift_JIS
//! 3. windows-1252 (Latin-1 class)
//! 4. UTF-8 (always succeeds)
//!
//! Once the codepage is announced, every fragment is written with
//! [`encode_with`] in that same encoding. This module also provides
//! display-width helpers for column layout, where every non-ASCII character
//! occupies two columns.

use encoding_rs::Encoding;
use tracing::{debug, warn};

/// Text encoding selected for a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingChoice {
    EucKr,
    ShiftJis,
    Windows1252,
    Utf8,
}

impl EncodingChoice {
    /// Candidates in priority order; the last one never fails
    pub const CANDIDATES: [EncodingChoice; 4] = [
        EncodingChoice::EucKr,
        EncodingChoice::ShiftJis,
        EncodingChoice::Windows1252,
        EncodingChoice::Utf8,
    ];

    pub fn encoding(self) -> &'static Encoding {
        match self {
            EncodingChoice::EucKr => encoding_rs::EUC_KR,
            EncodingChoice::ShiftJis => encoding_rs::SHIFT_JIS,
            EncodingChoice::Windows1252 => encoding_rs::WINDOWS_1252,
            EncodingChoice::Utf8 => encoding_rs::UTF_8,
        }
    }

    pub fn name(self) -> &'static str {
        self.encoding().name()
    }

    /// ESC t n codepage table index for this encoding
    pub fn codepage(self) -> u8 {
        match self {
            EncodingChoice::EucKr => 18,
            EncodingChoice::ShiftJis => 1,
            EncodingChoice::Windows1252 => 16,
            EncodingChoice::Utf8 => 0,
        }
    }
}

/// Encoded text plus the encoding that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub choice: EncodingChoice,
}

/// Encode text with the first lossless candidate encoding
///
/// Never fails: if every candidate reports unmappable characters the UTF-8
/// bytes are returned.
pub fn encode(text: &str) -> Encoded {
    for choice in EncodingChoice::CANDIDATES {
        let (bytes, _, had_errors) = choice.encoding().encode(text);
        if had_errors {
            debug!(encoding = choice.name(), "unmappable characters, trying next encoding");
            continue;
        }
        let bytes = bytes.into_owned();
        verify_round_trip(text, &bytes, choice);
        return Encoded { bytes, choice };
    }

    Encoded {
        bytes: text.as_bytes().to_vec(),
        choice: EncodingChoice::Utf8,
    }
}

/// Encode text and return only the bytes
pub fn encode_bytes(text: &str) -> Vec<u8> {
    encode(text).bytes
}

/// Encode text with a fixed encoding
///
/// Characters the encoding cannot represent are written as `?`, so the bytes
/// always match the codepage announced for the receipt.
pub fn encode_with(text: &str, choice: EncodingChoice) -> Vec<u8> {
    let encoding = choice.encoding();
    let (bytes, _, had_errors) = encoding.encode(text);
    if !had_errors {
        return bytes.into_owned();
    }

    warn!(encoding = choice.name(), "unmappable characters replaced with '?'");
    let mut out = Vec::with_capacity(text.len());
    let mut tmp = [0u8; 4];
    for c in text.chars() {
        let (bytes, _, had_errors) = encoding.encode(c.encode_utf8(&mut tmp));
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Pick the encoding `encode` would use for `text`
pub fn select_encoding(text: &str) -> EncodingChoice {
    EncodingChoice::CANDIDATES
        .into_iter()
        .find(|choice| !choice.encoding().encode(text).2)
        .unwrap_or(EncodingChoice::Utf8)
}

/// Decode the produced bytes and compare with the input. Advisory only.
fn verify_round_trip(text: &str, bytes: &[u8], choice: EncodingChoice) {
    let (decoded, had_errors) = choice.encoding().decode_without_bom_handling(bytes);
    if had_errors || decoded != text {
        warn!(
            encoding = choice.name(),
            text = text,
            decoded = %decoded,
            "round-trip mismatch"
        );
    }
}

/// Column width of a character: 2 outside the ASCII range, 1 otherwise
pub fn char_width(c: char) -> usize {
    if (c as u32) > 0x7F { 2 } else { 1 }
}

/// Display width of a string in printer columns
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Truncate a string to fit within a display width
pub fn truncate_display(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut result = String::new();
    for c in s.chars() {
        let w = char_width(c);
        if width + w > max_width {
            break;
        }
        result.push(c);
        width += w;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("안녕"), 4);
        assert_eq!(display_width("AB결제CD"), 8);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("hello world", 5), "hello");
        assert_eq!(truncate_display("가나다라", 4), "가나");
        assert_eq!(truncate_display("AB가나", 3), "AB");
        assert_eq!(truncate_display("AB가나", 4), "AB가");
        assert_eq!(truncate_display("abc", 10), "abc");
    }

    #[test]
    fn test_encode_with_fixed_choice() {
        assert_eq!(encode_with("café", EncodingChoice::Windows1252), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_with("café", EncodingChoice::Utf8), "café".as_bytes());
        assert_eq!(encode_with("결제", EncodingChoice::EucKr), encode_bytes("결제"));
    }

    #[test]
    fn test_encode_with_substitutes_unmappable() {
        // é has no EUC-KR mapping
        assert_eq!(encode_with("café 1", EncodingChoice::EucKr), b"caf? 1");
        let bytes = encode_with("가🙂", EncodingChoice::EucKr);
        assert_eq!(bytes, vec![0xB0, 0xA1, b'?']);
    }

    #[test]
    fn test_ascii_uses_first_candidate() {
        let encoded = encode("Amount: 4.5 USDT");
        assert_eq!(encoded.choice, EncodingChoice::EucKr);
        assert_eq!(encoded.bytes, b"Amount: 4.5 USDT");
    }

    #[test]
    fn test_korean_encodes_as_euc_kr() {
        let encoded = encode("감사합니다");
        assert_eq!(encoded.choice, EncodingChoice::EucKr);
        // 2 bytes per hangul syllable
        assert_eq!(encoded.bytes.len(), 10);
        assert_eq!(&encoded.bytes[..2], &[0xB0, 0xA8]);
    }

    #[test]
    fn test_halfwidth_katakana_falls_to_shift_jis() {
        let encoded = encode("ｶ");
        assert_eq!(encoded.choice, EncodingChoice::ShiftJis);
        assert_eq!(encoded.bytes, vec![0xB6]);
    }

    #[test]
    fn test_latin_accent_falls_to_windows_1252() {
        let encoded = encode("café");
        assert_eq!(encoded.choice, EncodingChoice::Windows1252);
        assert_eq!(encoded.bytes, vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_unmappable_falls_to_utf8() {
        let text = "paid 🙂";
        let encoded = encode(text);
        assert_eq!(encoded.choice, EncodingChoice::Utf8);
        assert_eq!(encoded.bytes, text.as_bytes());
        assert_eq!(select_encoding(text), EncodingChoice::Utf8);
    }

    #[test]
    fn test_encode_never_fails() {
        for text in ["", "\0", "\u{FFFF}", "混合 mixed ñ 🙂 결제", "\u{10FFFF}"] {
            let encoded = encode(text);
            if !text.is_empty() {
                assert!(!encoded.bytes.is_empty());
            }
        }
        assert!(encode_bytes("").is_empty());
    }
}
