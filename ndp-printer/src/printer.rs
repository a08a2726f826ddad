//! Print sinks for sending ESC/POS data
//!
//! Supports:
//! - Network printers (raw TCP, usually port 9100)
//! - Device-file printers (serial tty or USB line printer, e.g. `/dev/ttyS4`)
//!
//! A sink receives one command buffer via [`PrintSink::set_buffer`] and
//! sends it on [`PrintSink::print`]. There is no acknowledgment channel:
//! a print is considered successful once the bytes are written and flushed.
//! Writing is bounded by a timeout so a stalled printer cannot hold the
//! caller forever.

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Default bound on sending one buffer (open or connect excluded for TCP)
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for printer transports
#[async_trait]
pub trait PrintSink: Send {
    /// Stage the command buffer for the next print
    fn set_buffer(&mut self, data: Vec<u8>);

    /// Send the staged buffer to the device. The buffer is consumed.
    async fn print(&mut self) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (raw TCP)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
    write_timeout: Duration,
    buffer: Option<Vec<u8>>,
}

impl NetworkPrinter {
    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: Duration::from_secs(5),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            buffer: None,
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bound on writing and flushing the buffer
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl PrintSink for NetworkPrinter {
    fn set_buffer(&mut self, data: Vec<u8>) {
        self.buffer = Some(data);
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    async fn print(&mut self) -> PrintResult<()> {
        let data = self.buffer.take().ok_or(PrintError::EmptyBuffer)?;

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        let send = async {
            stream.write_all(&data).await?;
            stream.flush().await
        };
        tokio::time::timeout(self.write_timeout, send)
            .await
            .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.addr)))??;

        info!(bytes = data.len(), "Print job sent");
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

/// Printer attached as a character device (serial port, /dev/usb/lp0)
///
/// The device is opened per print and closed afterwards. Line settings such
/// as baud rate are expected to be configured on the port beforehand.
#[derive(Debug, Clone)]
pub struct DevicePrinter {
    path: PathBuf,
    timeout: Duration,
    buffer: Option<Vec<u8>>,
}

impl DevicePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_WRITE_TIMEOUT,
            buffer: None,
        }
    }

    /// Set the bound on opening the device and writing the buffer
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PrintSink for DevicePrinter {
    fn set_buffer(&mut self, data: Vec<u8>) {
        self.buffer = Some(data);
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn print(&mut self) -> PrintResult<()> {
        let data = self.buffer.take().ok_or(PrintError::EmptyBuffer)?;

        let path = &self.path;
        let write = async {
            let mut device = tokio::fs::OpenOptions::new()
                .write(true)
                .open(path)
                .await
                .map_err(|source| PrintError::Device {
                    path: path.clone(),
                    source,
                })?;

            device.write_all(&data).await?;
            device.flush().await?;
            Ok::<(), PrintError>(())
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", path.display())))??;

        info!(bytes = data.len(), "Print job written");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok()
    }
}

/// Printer selected from configuration
///
/// `tcp://host:port` selects a [`NetworkPrinter`]; anything else is treated
/// as a device path.
#[derive(Debug, Clone)]
pub enum ConfiguredPrinter {
    Network(NetworkPrinter),
    Device(DevicePrinter),
}

impl ConfiguredPrinter {
    pub fn from_target(target: &str) -> PrintResult<Self> {
        let target = target.trim();
        if target.is_empty() {
            return Err(PrintError::InvalidConfig("Empty printer target".to_string()));
        }
        match target.strip_prefix("tcp://") {
            Some(addr) => Ok(Self::Network(NetworkPrinter::from_addr(addr)?)),
            None => Ok(Self::Device(DevicePrinter::new(target))),
        }
    }

    /// Bound every print's write on either transport
    pub fn with_write_timeout(self, timeout: Duration) -> Self {
        match self {
            Self::Network(p) => Self::Network(p.with_write_timeout(timeout)),
            Self::Device(p) => Self::Device(p.with_timeout(timeout)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Network(p) => format!("tcp://{}", p.addr()),
            Self::Device(p) => p.path().display().to_string(),
        }
    }
}

#[async_trait]
impl PrintSink for ConfiguredPrinter {
    fn set_buffer(&mut self, data: Vec<u8>) {
        match self {
            Self::Network(p) => p.set_buffer(data),
            Self::Device(p) => p.set_buffer(data),
        }
    }

    async fn print(&mut self) -> PrintResult<()> {
        match self {
            Self::Network(p) => p.print().await,
            Self::Device(p) => p.print().await,
        }
    }

    async fn is_online(&self) -> bool {
        match self {
            Self::Network(p) => p.is_online().await,
            Self::Device(p) => p.is_online().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_network_printer_from_addr() {
        let printer = NetworkPrinter::from_addr("192.168.1.100:9100").unwrap();
        assert_eq!(printer.addr().port(), 9100);
    }

    #[test]
    fn test_invalid_addr() {
        let result = NetworkPrinter::from_addr("invalid");
        assert!(matches!(result, Err(PrintError::InvalidConfig(_))));
    }

    #[test]
    fn test_configured_printer_target() {
        let net = ConfiguredPrinter::from_target("tcp://10.0.0.5:9100").unwrap();
        assert!(matches!(net, ConfiguredPrinter::Network(_)));
        assert_eq!(net.describe(), "tcp://10.0.0.5:9100");

        let dev = ConfiguredPrinter::from_target("/dev/ttyS4").unwrap();
        assert!(matches!(dev, ConfiguredPrinter::Device(_)));
        assert_eq!(dev.describe(), "/dev/ttyS4");

        assert!(ConfiguredPrinter::from_target("  ").is_err());
    }

    #[tokio::test]
    async fn test_print_without_buffer() {
        let mut printer = DevicePrinter::new("/nonexistent/lp0");
        let result = printer.print().await;
        assert!(matches!(result, Err(PrintError::EmptyBuffer)));
    }

    #[tokio::test]
    async fn test_device_printer_writes_buffer_once() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut printer = DevicePrinter::new(file.path());
        assert!(printer.is_online().await);

        printer.set_buffer(vec![0x1B, 0x40, b'A', 0x0A]);
        printer.print().await.unwrap();

        let written = std::fs::read(file.path()).unwrap();
        assert_eq!(written, vec![0x1B, 0x40, b'A', 0x0A]);

        // Buffer is consumed by the first print
        assert!(matches!(printer.print().await, Err(PrintError::EmptyBuffer)));
    }

    #[tokio::test]
    async fn test_device_printer_missing_device() {
        let mut printer = DevicePrinter::new("/nonexistent/dir/lp0");
        assert!(!printer.is_online().await);
        printer.set_buffer(vec![0x0A]);
        match printer.print().await {
            Err(PrintError::Device { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/dir/lp0"))
            }
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_printer_sends_buffer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let mut printer = NetworkPrinter::from_addr(&addr.to_string()).unwrap();
        printer.set_buffer(b"\x1B\x40hello\n".to_vec());
        printer.print().await.unwrap();
        drop(printer);

        let received = server.await.unwrap();
        assert_eq!(received, b"\x1B\x40hello\n");
    }

    #[tokio::test]
    async fn test_network_printer_write_times_out_when_peer_stalls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept, then hold the socket open without reading
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(socket);
        });

        let mut printer = NetworkPrinter::from_addr(&addr.to_string())
            .unwrap()
            .with_write_timeout(Duration::from_millis(200));
        printer.set_buffer(vec![0u8; 64 * 1024 * 1024]);

        let started = std::time::Instant::now();
        let result = printer.print().await;
        assert!(matches!(result, Err(PrintError::Timeout(_))), "got {result:?}");
        assert!(started.elapsed() < Duration::from_secs(5));

        server.abort();
    }

    #[test]
    fn test_configured_printer_write_timeout() {
        let printer = ConfiguredPrinter::from_target("tcp://10.0.0.5:9100")
            .unwrap()
            .with_write_timeout(Duration::from_millis(750));
        match printer {
            ConfiguredPrinter::Network(p) => assert_eq!(p.write_timeout, Duration::from_millis(750)),
            other => panic!("expected network printer, got {other:?}"),
        }

        let printer = ConfiguredPrinter::from_target("/dev/usb/lp0")
            .unwrap()
            .with_write_timeout(Duration::from_millis(750));
        match printer {
            ConfiguredPrinter::Device(p) => assert_eq!(p.timeout, Duration::from_millis(750)),
            other => panic!("expected device printer, got {other:?}"),
        }
    }
}
