use crate::error::TransferError;
use crate::types::{TransferReport, TransferStatus, WorkItem};
use futures::future::BoxFuture;
use log::{debug, error};
use std::time::{Duration, Instant};
use tokio::fs::File;

/// Networking capability the scheduler hands transfers to.
///
/// `fetch` registers a transfer of `url` into `sink`. The returned future is
/// driven by the scheduler and resolves once the transfer has finished, with
/// the number of bytes written. The transport is responsible for enforcing
/// `timeout` and for flushing `sink` before resolving; the sink is dropped
/// (closed) when the future completes.
pub trait Transport {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        sink: File,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<u64, TransferError>>;
}

/// One dispatched work item together with its open destination file.
#[derive(Debug)]
pub struct TransferHandle<'q> {
    index: usize,
    item: &'q WorkItem,
    file: File,
}

impl<'q> TransferHandle<'q> {
    /// Opens the destination for writing, truncating existing content.
    pub fn create(index: usize, item: &'q WorkItem) -> Result<Self, TransferError> {
        let file = std::fs::File::create(&item.destination_path).map_err(|source| {
            TransferError::FileOpen {
                path: item.destination_path.clone(),
                source,
            }
        })?;

        Ok(Self {
            index,
            item,
            file: File::from_std(file),
        })
    }

    /// Registers the transfer with `transport` and returns the future that
    /// resolves to its report. The handle, and with it the file, is consumed.
    pub fn start<'a, T>(self, transport: &'a T, timeout: Duration) -> BoxFuture<'a, TransferReport>
    where
        T: Transport + ?Sized,
        'q: 'a,
    {
        let TransferHandle { index, item, file } = self;
        let started = Instant::now();
        debug!(
            "Registering transfer #{}: {} -> {}",
            index,
            item.source_url,
            item.destination_path.display()
        );
        let transfer = transport.fetch(&item.source_url, file, timeout);

        Box::pin(async move {
            let result = transfer.await;
            finish(index, item, result, started.elapsed())
        })
    }
}

/// Report for an item whose destination could not be opened.
pub fn open_failure(index: usize, item: &WorkItem, err: TransferError) -> TransferReport {
    finish(index, item, Err(err), Duration::ZERO)
}

fn finish(
    index: usize,
    item: &WorkItem,
    result: Result<u64, TransferError>,
    duration: Duration,
) -> TransferReport {
    let (status, bytes_downloaded, error) = match result {
        Ok(bytes) => (TransferStatus::Success, bytes, None),
        Err(e) => {
            error!("Transfer failed for {}: {}", item.source_url, e);
            (TransferStatus::Failed, 0, Some(e))
        }
    };

    TransferReport {
        index,
        url: item.source_url.clone(),
        destination: item.destination_path.clone(),
        status,
        bytes_downloaded,
        duration,
        error,
    }
}
