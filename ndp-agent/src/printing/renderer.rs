//! Payment receipt renderer
//!
//! Lays out a [`PrintJob`] as a list of [`Fragment`]s. Byte encoding happens
//! later in [`ndp_printer::ProtocolBuilder`].

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use ndp_printer::{Align, Font, Fragment, ProtocolBuilder, display_width, truncate_display};
use shared::PrintJob;

use super::amount;
use std::fmt;
use std::str::FromStr;

/// Receipt language and paper layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiptStyle {
    #[default]
    Korean,
    English,
}

impl ReceiptStyle {
    /// Paper width in display columns
    pub fn width(self) -> usize {
        match self {
            ReceiptStyle::Korean => 40,
            ReceiptStyle::English => 42,
        }
    }

    fn labels(self) -> &'static ReceiptLabels {
        match self {
            ReceiptStyle::Korean => &KOREAN_LABELS,
            ReceiptStyle::English => &ENGLISH_LABELS,
        }
    }
}

impl fmt::Display for ReceiptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptStyle::Korean => write!(f, "korean"),
            ReceiptStyle::English => write!(f, "english"),
        }
    }
}

impl FromStr for ReceiptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "korean" | "ko" => Ok(ReceiptStyle::Korean),
            "english" | "en" => Ok(ReceiptStyle::English),
            other => Err(format!("unknown receipt style: {}", other)),
        }
    }
}

struct ReceiptLabels {
    title: &'static str,
    product_heading: &'static str,
    item: &'static str,
    transaction_heading: &'static str,
    hash: &'static str,
    amount: &'static str,
    time: &'static str,
    address_heading: &'static str,
    from: &'static str,
    to: &'static str,
    closing: [&'static str; 2],
}

const KOREAN_LABELS: ReceiptLabels = ReceiptLabels {
    title: "결제 영수증",
    product_heading: "[상품 정보]",
    item: "상품명",
    transaction_heading: "[거래 정보]",
    hash: "거래 해시",
    amount: "결제 금액",
    time: "거래 시간",
    address_heading: "[지갑 정보]",
    from: "보낸 주소",
    to: "받는 주소",
    closing: ["결제가 완료되었습니다", "감사합니다!"],
};

const ENGLISH_LABELS: ReceiptLabels = ReceiptLabels {
    title: "PAYMENT RECEIPT",
    product_heading: "[PAYMENT INFORMATION]",
    item: "Item",
    transaction_heading: "[BLOCKCHAIN VERIFICATION]",
    hash: "Transaction Hash",
    amount: "Amount",
    time: "Time",
    address_heading: "[WALLETS]",
    from: "From",
    to: "To",
    closing: ["Thank You!", "Have a Wonderful Day!"],
};

/// Payment receipt renderer
pub struct ReceiptFormatter {
    style: ReceiptStyle,
    width: usize,
    timezone: Tz,
    show_addresses: bool,
}

impl ReceiptFormatter {
    /// Create a renderer; paper width follows the style
    pub fn new(style: ReceiptStyle, timezone: Tz) -> Self {
        Self {
            style,
            width: style.width(),
            timezone,
            show_addresses: false,
        }
    }

    /// Print the sender and receiver wallets in their own section
    pub fn with_addresses(mut self, show: bool) -> Self {
        self.show_addresses = show;
        self
    }

    pub fn style(&self) -> ReceiptStyle {
        self.style
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Render a job to the complete device command stream
    pub fn render(&self, job: &PrintJob) -> Vec<u8> {
        let display_amount = amount::normalize(&job.amount_raw, &job.token);
        let fragments = self.format(job, &display_amount);
        ProtocolBuilder::new(self.width).build(&fragments)
    }

    /// Lay out a receipt. `display_amount` is the already formatted amount.
    pub fn format(&self, job: &PrintJob, display_amount: &str) -> Vec<Fragment> {
        self.format_at(job, display_amount, Utc::now())
    }

    /// Same as [`format`](Self::format) with an explicit clock for
    /// unparseable timestamps
    pub fn format_at(
        &self,
        job: &PrintJob,
        display_amount: &str,
        now: DateTime<Utc>,
    ) -> Vec<Fragment> {
        let labels = self.style.labels();
        let mut out = Vec::with_capacity(64);

        self.render_header(&mut out, labels);

        // Product
        section_heading(&mut out, labels.product_heading);
        self.info(&mut out, labels.item, job.product_name());
        out.push(Fragment::Separator);

        // Transaction
        section_heading(&mut out, labels.transaction_heading);
        self.info(&mut out, labels.hash, &shorten_hash(&job.transaction_hash));
        self.info(&mut out, labels.amount, display_amount);
        let time = format_timestamp(&job.timestamp, self.timezone, now);
        self.info(&mut out, labels.time, &time);
        out.push(Fragment::Separator);

        if self.show_addresses {
            section_heading(&mut out, labels.address_heading);
            self.info(&mut out, labels.from, &shorten_address(&job.from_address));
            self.info(&mut out, labels.to, &shorten_address(&job.to_address));
            out.push(Fragment::Separator);
        }

        self.render_footer(&mut out, labels);
        out
    }

    /// Fixed sample job for test prints
    pub fn test_job() -> PrintJob {
        PrintJob {
            id: "test-print".to_string(),
            transaction_hash: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            amount_raw: "4500000000000000000".to_string(),
            token: "USDT".to_string(),
            from_address: "0xabc123def456789012345678901234567890abcd".to_string(),
            to_address: "0xdef456789012345678901234567890abcdef1234".to_string(),
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            product_name: None,
        }
    }

    fn render_header(&self, out: &mut Vec<Fragment>, labels: &ReceiptLabels) {
        out.extend([
            Fragment::SetAlign(Align::Center),
            Fragment::SetFont(Font::BoldLarge),
            Fragment::text(labels.title),
            Fragment::LineFeed,
            Fragment::LineFeed,
            Fragment::SetFont(Font::Normal),
            Fragment::SetAlign(Align::Left),
            Fragment::Separator,
        ]);
    }

    fn render_footer(&self, out: &mut Vec<Fragment>, labels: &ReceiptLabels) {
        out.extend([
            Fragment::LineFeed,
            Fragment::SetAlign(Align::Center),
            Fragment::text(labels.closing[0]),
            Fragment::LineFeed,
            Fragment::text(labels.closing[1]),
            Fragment::LineFeed,
            Fragment::LineFeed,
            Fragment::LineFeed,
        ]);
    }

    /// Info line plus one blank line of spacing
    fn info(&self, out: &mut Vec<Fragment>, label: &str, value: &str) {
        out.push(Fragment::Text(info_line(label, value, self.width)));
        out.push(Fragment::LineFeed);
        out.push(Fragment::LineFeed);
    }
}

impl Default for ReceiptFormatter {
    fn default() -> Self {
        Self::new(ReceiptStyle::Korean, chrono_tz::Asia::Seoul)
    }
}

fn section_heading(out: &mut Vec<Fragment>, heading: &str) {
    out.extend([
        Fragment::SetFont(Font::Bold),
        Fragment::text(heading),
        Fragment::SetFont(Font::Normal),
        Fragment::LineFeed,
        Fragment::LineFeed,
    ]);
}

/// `label: value`, never wider than `width` columns.
///
/// A value that does not fit is cut to leave room for `"..."`.
pub fn info_line(label: &str, value: &str, width: usize) -> String {
    let prefix = format!("{}: ", label);
    let max_value = width.saturating_sub(display_width(&prefix));

    if display_width(value) <= max_value {
        return format!("{}{}", prefix, value);
    }
    if max_value >= 3 {
        return format!("{}{}...", prefix, truncate_display(value, max_value - 3));
    }
    // Label alone fills the line
    truncate_display(&format!("{}{}", prefix, value), width)
}

/// First 8 + "..." + last 8 characters when longer than 20
pub fn shorten_hash(hash: &str) -> String {
    shorten(hash, 20, 8, 8)
}

/// First 6 + "..." + last 6 characters when longer than 16
pub fn shorten_address(address: &str) -> String {
    shorten(address, 16, 6, 6)
}

fn shorten(s: &str, max: usize, head: usize, tail: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max {
        return s.to_string();
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}

/// Convert a UTC timestamp to `YYYY-MM-DD HH:MM:SS` in the given zone.
///
/// Accepts RFC 3339 or a naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` taken as UTC.
/// Falls back to `now` when neither parses.
pub fn format_timestamp(timestamp: &str, tz: Tz, now: DateTime<Utc>) -> String {
    parse_utc(timestamp)
        .unwrap_or_else(|| {
            tracing::warn!(timestamp, "unparseable timestamp, using current time");
            now
        })
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn parse_utc(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .map(|naive| naive.and_utc())
}
