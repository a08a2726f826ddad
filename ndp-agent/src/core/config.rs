use crate::printing::{ReceiptFormatter, ReceiptStyle};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use ndp_client::ClientConfig;
use ndp_printer::{ConfiguredPrinter, PrintResult};
use std::time::Duration;

/// Agent configuration
///
/// # Environment variables
///
/// Every option can also be set through the environment (a `.env` file in
/// the working directory is loaded first). Flags take precedence.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | NDP_SERVER_URL | http://localhost:3000 | Receipt queue server |
/// | NDP_POLL_INTERVAL_MS | 3000 | Delay between polls |
/// | NDP_CONNECT_TIMEOUT_MS | 10000 | HTTP connect timeout |
/// | NDP_REQUEST_TIMEOUT_MS | 15000 | HTTP request timeout |
/// | NDP_SETTLE_MS | 3000 | Wait after printing before reporting |
/// | NDP_PRINTER | /dev/ttyS4 | Device path or `tcp://host:port` |
/// | NDP_PRINT_TIMEOUT_MS | 10000 | Bound on writing one receipt |
/// | NDP_RECEIPT_STYLE | korean | `korean` or `english` |
/// | NDP_TIMEZONE | Asia/Seoul | Zone for printed times |
/// | NDP_SHOW_ADDRESSES | false | Print wallet addresses |
/// | NDP_LOG_LEVEL | info | Log filter |
/// | NDP_LOG_DIR | - | Daily log files instead of stdout |
///
/// # Example
///
/// ```ignore
/// NDP_SERVER_URL=https://pay.example.com NDP_PRINTER=tcp://192.168.1.50:9100 ndp-agent
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "ndp-agent", version, about = "Unattended payment receipt printer")]
pub struct Config {
    /// Receipt queue server base URL
    #[arg(long, env = "NDP_SERVER_URL", default_value = "http://localhost:3000", global = true)]
    pub server_url: String,

    /// Delay between polls (ms); doubled after a failed fetch
    #[arg(long, env = "NDP_POLL_INTERVAL_MS", default_value_t = 3000, global = true)]
    pub poll_interval_ms: u64,

    /// HTTP connect timeout (ms)
    #[arg(long, env = "NDP_CONNECT_TIMEOUT_MS", default_value_t = 10_000, global = true)]
    pub connect_timeout_ms: u64,

    /// HTTP request timeout (ms)
    #[arg(long, env = "NDP_REQUEST_TIMEOUT_MS", default_value_t = 15_000, global = true)]
    pub request_timeout_ms: u64,

    /// Wait after a print before reporting it completed (ms)
    #[arg(long, env = "NDP_SETTLE_MS", default_value_t = 3000, global = true)]
    pub settle_ms: u64,

    /// Printer target: device path or tcp://host:port
    #[arg(long, env = "NDP_PRINTER", default_value = "/dev/ttyS4", global = true)]
    pub printer: String,

    /// Bound on sending one receipt to the printer (ms)
    #[arg(long, env = "NDP_PRINT_TIMEOUT_MS", default_value_t = 10_000, global = true)]
    pub print_timeout_ms: u64,

    /// Receipt language and paper width
    #[arg(long, env = "NDP_RECEIPT_STYLE", default_value = "korean", global = true)]
    pub receipt_style: ReceiptStyle,

    /// IANA timezone for printed transaction times
    #[arg(
        long,
        env = "NDP_TIMEZONE",
        default_value = "Asia/Seoul",
        value_parser = parse_timezone,
        global = true
    )]
    pub timezone: Tz,

    /// Print sender and receiver wallet addresses
    #[arg(long, env = "NDP_SHOW_ADDRESSES", global = true)]
    pub show_addresses: bool,

    /// Log level or filter directive
    #[arg(long, env = "NDP_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Directory for daily rolling log files
    #[arg(long, env = "NDP_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Poll the queue and print receipts (default)
    Run,
    /// Check that the queue server is reachable
    Probe,
    /// Print the sample receipt
    TestPrint,
    /// Dump the sample receipt's command bytes as hex, without a printer
    Render,
}

impl Config {
    /// Subcommand to run, `run` when none was given
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.server_url.clone())
            .with_connect_timeout_ms(self.connect_timeout_ms)
            .with_request_timeout_ms(self.request_timeout_ms)
    }

    pub fn formatter(&self) -> ReceiptFormatter {
        ReceiptFormatter::new(self.receipt_style, self.timezone).with_addresses(self.show_addresses)
    }

    pub fn printer(&self) -> PrintResult<ConfiguredPrinter> {
        Ok(ConfiguredPrinter::from_target(&self.printer)?.with_write_timeout(self.print_timeout()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_millis(self.print_timeout_ms)
    }
}

fn parse_timezone(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>()
        .map_err(|e| format!("unknown timezone '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommand_and_flags() {
        let config = Config::try_parse_from([
            "ndp-agent",
            "render",
            "--receipt-style",
            "english",
            "--timezone",
            "UTC",
            "--server-url",
            "http://10.0.0.2:8080",
            "--poll-interval-ms",
            "500",
            "--show-addresses",
        ])
        .unwrap();

        assert_eq!(config.command(), Command::Render);
        assert_eq!(config.receipt_style, ReceiptStyle::English);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.show_addresses);
        assert_eq!(config.client_config().base_url, "http://10.0.0.2:8080");

        let formatter = config.formatter();
        assert_eq!(formatter.width(), 42);
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let result = Config::try_parse_from(["ndp-agent", "--timezone", "Mars/Olympus"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_style() {
        let result = Config::try_parse_from(["ndp-agent", "--receipt-style", "klingon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tcp_printer_target() {
        let config =
            Config::try_parse_from(["ndp-agent", "--printer", "tcp://127.0.0.1:9100"]).unwrap();
        let printer = config.printer().unwrap();
        assert!(matches!(printer, ConfiguredPrinter::Network(_)));
    }

    #[test]
    fn test_print_timeout() {
        let config = Config::try_parse_from(["ndp-agent"]).unwrap();
        assert_eq!(config.print_timeout(), Duration::from_secs(10));

        let config =
            Config::try_parse_from(["ndp-agent", "--print-timeout-ms", "2500"]).unwrap();
        assert_eq!(config.print_timeout(), Duration::from_millis(2500));
    }
}
