//! Receipt polling worker
//!
//! Pulls pending jobs from the queue server, prints them one at a time and
//! reports each status change back.
//!
//! Per job: Printing → (print, settle) → Completed | Failed.
//! Queue items that do not decode are reported Printing → Failed without
//! printing, when their id can be read.
//! A failed fetch doubles the next delay; the next successful fetch resets it.

use ndp_client::{ClientResult, QueueApi};
use ndp_printer::PrintSink;
use shared::{JobStatus, PrintJob, QueueItem};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::renderer::ReceiptFormatter;

/// Default delay between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
/// Default wait after a print before reporting it done
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(3000);

/// Outcome counts of one poll cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Queue consumer driving a single print sink
pub struct PollingWorker<Q, S> {
    queue: Q,
    sink: S,
    formatter: ReceiptFormatter,
    interval: Duration,
    settle: Duration,
}

impl<Q: QueueApi, S: PrintSink> PollingWorker<Q, S> {
    pub fn new(queue: Q, sink: S, formatter: ReceiptFormatter) -> Self {
        Self {
            queue,
            sink,
            formatter,
            interval: DEFAULT_POLL_INTERVAL,
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until `shutdown` is cancelled.
    ///
    /// Cancellation is only observed between cycles, so a job that is
    /// printing always gets its final status report.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            settle_ms = self.settle.as_millis() as u64,
            "Polling worker started"
        );

        let mut delay = Duration::ZERO;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            delay = match self.run_cycle().await {
                Ok(_) => self.interval,
                Err(e) => {
                    let backoff = self.interval * 2;
                    tracing::warn!(
                        error = %e,
                        retry_ms = backoff.as_millis() as u64,
                        "Queue fetch failed, backing off"
                    );
                    backoff
                }
            };
        }

        tracing::info!("Polling worker stopped");
    }

    /// Fetch once and print every returned job in order.
    ///
    /// Only a failed fetch is an error. Print and report failures are logged
    /// and counted, and never stop the batch.
    pub async fn run_cycle(&mut self) -> ClientResult<CycleStats> {
        let items = self.queue.fetch_pending().await?;

        let mut stats = CycleStats {
            fetched: items.len(),
            ..Default::default()
        };
        if items.is_empty() {
            return Ok(stats);
        }

        tracing::info!(count = items.len(), "Pending receipts fetched");
        for item in items {
            let status = match item {
                QueueItem::Job(job) => self.process_job(&job).await,
                QueueItem::Invalid { id: Some(id), reason } => {
                    tracing::error!(job_id = %id, reason = %reason, "Queue item rejected");
                    Self::reject_item(&self.queue, &id, &reason).await
                }
                QueueItem::Invalid { id: None, reason } => {
                    tracing::error!(reason = %reason, "Queue item without id skipped");
                    JobStatus::Failed
                }
            };
            match status {
                JobStatus::Completed => stats.completed += 1,
                status if status.is_terminal() => stats.failed += 1,
                status => {
                    tracing::warn!(status = %status, "Job left in non-final status");
                    stats.failed += 1;
                }
            }
        }

        tracing::info!(
            fetched = stats.fetched,
            completed = stats.completed,
            failed = stats.failed,
            "Poll cycle finished"
        );
        Ok(stats)
    }

    /// Print one job, returning the status it ended in
    async fn process_job(&mut self, job: &PrintJob) -> JobStatus {
        let status =
            Self::advance(&self.queue, &job.id, JobStatus::Pending, JobStatus::Printing, None)
                .await;

        let data = self.formatter.render(job);
        tracing::debug!(job_id = %job.id, bytes = data.len(), "Receipt rendered");

        self.sink.set_buffer(data);
        let result = self.sink.print().await;
        tokio::time::sleep(self.settle).await;

        match result {
            Ok(()) => {
                tracing::info!(job_id = %job.id, "Receipt printed");
                Self::advance(&self.queue, &job.id, status, JobStatus::Completed, None).await
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(job_id = %job.id, error = %message, "Receipt print failed");
                Self::advance(&self.queue, &job.id, status, JobStatus::Failed, Some(&message))
                    .await
            }
        }
    }

    /// Report an undecodable item failed without printing it
    async fn reject_item(queue: &Q, job_id: &str, reason: &str) -> JobStatus {
        let status =
            Self::advance(queue, job_id, JobStatus::Pending, JobStatus::Printing, None).await;
        Self::advance(queue, job_id, status, JobStatus::Failed, Some(reason)).await
    }

    /// Apply a status transition and report it. Report errors are logged only.
    ///
    /// Borrows only the queue so the sink never needs to be `Sync`.
    async fn advance(
        queue: &Q,
        job_id: &str,
        current: JobStatus,
        next: JobStatus,
        error_message: Option<&str>,
    ) -> JobStatus {
        let next = match current.transition(next) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Status transition rejected");
                return current;
            }
        };

        if let Err(e) = queue.report_status(job_id, next, error_message).await {
            tracing::warn!(job_id = %job_id, status = %next, error = %e, "Status report failed");
        }
        next
    }
}

/// Lifecycle state of a [`PollingHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
}

/// Start/stop control over a [`PollingWorker`] running on its own task.
///
/// The worker is handed back when the task stops, so the handle can be
/// started again.
pub struct PollingHandle<Q, S> {
    worker: Option<PollingWorker<Q, S>>,
    running: Option<(CancellationToken, JoinHandle<PollingWorker<Q, S>>)>,
}

impl<Q, S> PollingHandle<Q, S>
where
    Q: QueueApi + 'static,
    S: PrintSink + 'static,
{
    pub fn new(worker: PollingWorker<Q, S>) -> Self {
        Self {
            worker: Some(worker),
            running: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        if self.running.is_some() {
            WorkerState::Running
        } else {
            WorkerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Spawn the polling loop. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.running.is_some() {
            return false;
        }
        let Some(mut worker) = self.worker.take() else {
            tracing::error!("Polling worker unavailable, cannot start");
            return false;
        };

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let task = tokio::spawn(async move {
            worker.run(token).await;
            worker
        });

        self.running = Some((shutdown, task));
        true
    }

    /// Stop the loop and wait for the in-flight cycle to finish.
    /// Returns false if it was not running.
    pub async fn stop(&mut self) -> bool {
        let Some((shutdown, task)) = self.running.take() else {
            return false;
        };

        shutdown.cancel();
        match task.await {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => tracing::error!(error = %e, "Polling task ended abnormally"),
        }
        true
    }
}
