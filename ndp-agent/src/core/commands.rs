//! CLI command handlers

use anyhow::Context;
use ndp_client::{QueueApi, QueueClient};
use ndp_printer::{PrintSink, hex_dump};

use super::config::{Command, Config};
use crate::printing::{PollingHandle, PollingWorker, ReceiptFormatter};

/// Dispatch the configured subcommand
pub async fn execute(config: &Config) -> anyhow::Result<()> {
    match config.command() {
        Command::Run => run(config).await,
        Command::Probe => probe(config).await,
        Command::TestPrint => test_print(config).await,
        Command::Render => {
            println!("{}", render_sample(config));
            Ok(())
        }
    }
}

/// Poll and print until Ctrl-C
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let client = QueueClient::new(&config.client_config()).context("failed to build HTTP client")?;
    let printer = config.printer().context("invalid printer target")?;
    let formatter = config.formatter();

    tracing::info!(
        server = %client.base_url(),
        printer = %printer.describe(),
        print_timeout_ms = config.print_timeout_ms,
        style = %formatter.style(),
        timezone = %formatter.timezone(),
        "NDP agent starting"
    );

    if !client.probe().await {
        tracing::warn!("Queue server not reachable yet, polling anyway");
    }
    if !printer.is_online().await {
        tracing::warn!(printer = %printer.describe(), "Printer not reachable yet");
    }

    let worker = PollingWorker::new(client, printer, formatter)
        .with_interval(config.poll_interval())
        .with_settle(config.settle());
    let mut handle = PollingHandle::new(worker);
    handle.start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");

    handle.stop().await;
    Ok(())
}

/// Probe the queue server once
pub async fn probe(config: &Config) -> anyhow::Result<()> {
    let client = QueueClient::new(&config.client_config()).context("failed to build HTTP client")?;
    if client.probe().await {
        println!("Connected: {}", client.base_url());
        Ok(())
    } else {
        anyhow::bail!("server unreachable: {}", client.base_url())
    }
}

/// Print the sample receipt on the configured printer
pub async fn test_print(config: &Config) -> anyhow::Result<()> {
    let mut printer = config.printer().context("invalid printer target")?;
    let data = config.formatter().render(&ReceiptFormatter::test_job());

    tracing::info!(printer = %printer.describe(), bytes = data.len(), "Printing test receipt");
    printer.set_buffer(data);
    printer
        .print()
        .await
        .with_context(|| format!("test print failed on {}", printer.describe()))?;
    Ok(())
}

/// Hex dump of the sample receipt's command stream
pub fn render_sample(config: &Config) -> String {
    hex_dump(&config.formatter().render(&ReceiptFormatter::test_job()))
}
