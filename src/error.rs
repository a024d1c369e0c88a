use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a numeric option value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundError {
    Underflow,
    Overflow,
    Malformed,
}

impl fmt::Display for BoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundError::Underflow => write!(f, "underflow"),
            BoundError::Overflow => write!(f, "overflow"),
            BoundError::Malformed => write!(f, "unknown characters after specifier"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No arguments given")]
    NoArguments,

    #[error("Can't find = in argument: {0}")]
    MissingSeparator(String),

    #[error("In script-safe mode, number of arguments must be an even amount (got {0})")]
    OddArgumentCount(usize),

    #[error("Timeout {reason}: {value}")]
    InvalidTimeout { value: String, reason: BoundError },

    #[error("Parallel {reason}: {value}")]
    InvalidParallel { value: String, reason: BoundError },

    #[error(transparent)]
    Cli(#[from] clap::Error),
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TransferError {
    /// Numeric result code printed on the status line. Zero is reserved for success.
    pub fn code(&self) -> u8 {
        match self {
            TransferError::FileOpen { .. } => 1,
            TransferError::RequestError(_) => 2,
            TransferError::Timeout(_) => 3,
            TransferError::HttpStatus(_) => 4,
            TransferError::IoError(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_nonzero() {
        let errors = [
            TransferError::FileOpen {
                path: PathBuf::from("x"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
            TransferError::RequestError(
                reqwest::Client::new().get("not a url").build().unwrap_err(),
            ),
            TransferError::Timeout(Duration::from_millis(5)),
            TransferError::HttpStatus(reqwest::StatusCode::NOT_FOUND),
            TransferError::IoError(std::io::Error::from(std::io::ErrorKind::WriteZero)),
        ];
        let mut codes: Vec<u8> = errors.iter().map(TransferError::code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn invalid_timeout_message_names_reason() {
        let err = ParseError::InvalidTimeout {
            value: "0".into(),
            reason: BoundError::Underflow,
        };
        assert_eq!(err.to_string(), "Timeout underflow: 0");
    }
}
