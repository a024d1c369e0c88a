use crate::types::{TransferReport, TransferStatus};
use colored::*;

/// One status line per completed transfer: result code, status text and URL.
pub fn status_line(report: &TransferReport) -> String {
    let text = match &report.error {
        None => "OK".to_string(),
        Some(e) => e.to_string(),
    };
    let outcome = format!("R: {} - {}", report.code(), text);
    let outcome = match report.status {
        TransferStatus::Success => outcome.green(),
        TransferStatus::Failed => outcome.red(),
    };
    format!("massget: {} <{}>", outcome, report.url)
}

pub fn print_status(report: &TransferReport) {
    eprintln!("{}", status_line(report));
}
