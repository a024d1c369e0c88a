use crate::error::TransferError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u32 = 1000;
pub const DEFAULT_PARALLEL: usize = 8;
pub const MAX_PARALLEL: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub destination_path: PathBuf,
    pub source_url: String,
}

impl WorkItem {
    pub fn new(destination_path: impl Into<PathBuf>, source_url: impl Into<String>) -> Self {
        Self {
            destination_path: destination_path.into(),
            source_url: source_url.into(),
        }
    }
}

/// Work items in command-line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkQueue {
    items: Vec<WorkItem>,
}

impl WorkQueue {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }
}

impl From<Vec<WorkItem>> for WorkQueue {
    fn from(items: Vec<WorkItem>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// `PATH=URL` tokens.
    KeyValueSplit,
    /// `PATH URL` token pairs (`--script-safe`).
    PositionalPair,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub timeout_ms: u32,
    pub max_parallel: usize,
    pub input_mode: InputMode,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_parallel: DEFAULT_PARALLEL,
            input_mode: InputMode::KeyValueSplit,
        }
    }
}

#[derive(Debug)]
pub struct TransferReport {
    pub index: usize,
    pub url: String,
    pub destination: PathBuf,
    pub status: TransferStatus,
    pub bytes_downloaded: u64,
    pub duration: Duration,
    pub error: Option<TransferError>,
}

impl TransferReport {
    /// Result code for the status line; zero on success.
    pub fn code(&self) -> u8 {
        self.error.as_ref().map_or(0, TransferError::code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    Failed,
}

#[derive(Debug)]
pub struct BatchSummary {
    pub total_transfers: usize,
    pub successful_transfers: usize,
    pub failed_transfers: usize,
    pub total_bytes_downloaded: u64,
    pub total_duration: Duration,
    /// Reports in completion order.
    pub reports: Vec<TransferReport>,
}

impl BatchSummary {
    pub fn from_reports(reports: Vec<TransferReport>, total_duration: Duration) -> Self {
        let total_transfers = reports.len();
        let successful_transfers = reports
            .iter()
            .filter(|r| r.status == TransferStatus::Success)
            .count();
        let total_bytes_downloaded = reports.iter().map(|r| r.bytes_downloaded).sum();

        Self {
            total_transfers,
            successful_transfers,
            failed_transfers: total_transfers - successful_transfers,
            total_bytes_downloaded,
            total_duration,
            reports,
        }
    }
}
