//! Sliding-window transfer scheduler.
//!
//! Keeps up to `max_parallel` transfers in flight. Whenever one finishes its
//! outcome is reported and the next queued item is dispatched into the freed
//! slot, until the queue is exhausted and nothing is left in flight.

use crate::transfer::{open_failure, TransferHandle, Transport};
use crate::types::{BatchSummary, Config, TransferReport, WorkQueue};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info};
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on how long one drive of the transport may block before the
/// loop re-evaluates.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct Scheduler<'q, T: ?Sized, F> {
    config: &'q Config,
    queue: &'q WorkQueue,
    transport: &'q T,
    on_report: F,
    next_index: usize,
    in_flight: FuturesUnordered<BoxFuture<'q, TransferReport>>,
    reports: Vec<TransferReport>,
}

impl<'q, T, F> Scheduler<'q, T, F>
where
    T: Transport + ?Sized,
    F: FnMut(&TransferReport),
{
    pub fn new(config: &'q Config, queue: &'q WorkQueue, transport: &'q T, on_report: F) -> Self {
        Self {
            config,
            queue,
            transport,
            on_report,
            next_index: 0,
            in_flight: FuturesUnordered::new(),
            reports: Vec::with_capacity(queue.len()),
        }
    }

    /// Runs every queued transfer to completion. Individual failures are
    /// reported through `on_report` and never stop the batch.
    pub async fn run(mut self) -> BatchSummary {
        let started = Instant::now();
        if self.queue.is_empty() {
            return BatchSummary::from_reports(Vec::new(), started.elapsed());
        }

        self.fill_window();
        debug!(
            "Initial wave dispatched {} of {} transfers",
            self.in_flight.len(),
            self.queue.len()
        );

        while !self.in_flight.is_empty() {
            let report = match tokio::time::timeout(POLL_INTERVAL, self.in_flight.next()).await {
                Ok(Some(report)) => report,
                Ok(None) => break,
                Err(_) => {
                    debug!("{} transfers still in flight", self.in_flight.len());
                    continue;
                }
            };
            self.complete(report);
            self.fill_window();
        }

        debug_assert_eq!(self.next_index, self.queue.len());
        let summary = BatchSummary::from_reports(self.reports, started.elapsed());
        info!(
            "Batch finished: {} transfers, {} succeeded, {} failed, {} bytes in {:.2?}",
            summary.total_transfers,
            summary.successful_transfers,
            summary.failed_transfers,
            summary.total_bytes_downloaded,
            summary.total_duration
        );
        summary
    }

    /// Dispatches queued items in order until the window is full or the queue
    /// is exhausted. Items whose destination cannot be opened are reported on
    /// the spot and do not occupy a slot.
    fn fill_window(&mut self) {
        while self.in_flight.len() < self.config.max_parallel {
            let Some(item) = self.queue.get(self.next_index) else {
                break;
            };
            let index = self.next_index;
            self.next_index += 1;

            match TransferHandle::create(index, item) {
                Ok(handle) => {
                    let transfer = handle.start(self.transport, self.config.timeout());
                    self.in_flight.push(transfer);
                }
                Err(e) => self.complete(open_failure(index, item, e)),
            }
        }
    }

    fn complete(&mut self, report: TransferReport) {
        debug!(
            "Transfer #{} -> {} done in {:.2?} ({} bytes)",
            report.index,
            report.destination.display(),
            report.duration,
            report.bytes_downloaded
        );
        (self.on_report)(&report);
        self.reports.push(report);
    }
}

/// Downloads every item of `queue` with at most `config.max_parallel`
/// transfers in flight, calling `on_report` once per item as it completes.
pub async fn run<T, F>(
    config: &Config,
    queue: &WorkQueue,
    transport: &T,
    on_report: F,
) -> BatchSummary
where
    T: Transport + ?Sized,
    F: FnMut(&TransferReport),
{
    Scheduler::new(config, queue, transport, on_report).run().await
}
