use crate::cli::Cli;
use crate::error::{BoundError, ParseError};
use crate::types::{Config, InputMode, WorkItem, WorkQueue, MAX_PARALLEL};
use clap::Parser;
use log::debug;
use std::ffi::OsString;
use std::num::IntErrorKind;

/// Splits `s` on the first occurrence of `sep`.
pub fn split_str(sep: char, s: &str) -> Option<(&str, &str)> {
    s.split_once(sep)
}

/// Parses the full argument vector (program name first) into the run
/// configuration and the ordered work list.
pub fn parse_args<I, T>(args: I) -> Result<(Config, WorkQueue), ParseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        return Err(ParseError::NoArguments);
    }

    let cli = Cli::try_parse_from(skip_empty_options(args))?;
    build(cli)
}

fn build(cli: Cli) -> Result<(Config, WorkQueue), ParseError> {
    let mut config = Config::default();

    if let Some(value) = cli.timeout {
        config.timeout_ms = parse_bounded(&value, i32::MAX as i64)
            .map(|ms| ms as u32)
            .map_err(|reason| ParseError::InvalidTimeout { value, reason })?;
    }
    if let Some(value) = cli.parallel {
        config.max_parallel = parse_bounded(&value, MAX_PARALLEL as i64)
            .map(|n| n as usize)
            .map_err(|reason| ParseError::InvalidParallel { value, reason })?;
    }
    if cli.script_safe {
        config.input_mode = InputMode::PositionalPair;
    }

    let queue = match config.input_mode {
        InputMode::KeyValueSplit => split_targets(&cli.targets)?,
        InputMode::PositionalPair => pair_targets(&cli.targets)?,
    };

    debug!(
        "Parsed {} targets: timeout={}ms parallel={} mode={:?}",
        queue.len(),
        config.timeout_ms,
        config.max_parallel,
        config.input_mode
    );
    Ok((config, queue))
}

/// Drops empty tokens in the option section, before the first target.
fn skip_empty_options(args: Vec<OsString>) -> Vec<OsString> {
    let mut in_options = true;
    args.into_iter()
        .enumerate()
        .filter(|(i, arg)| {
            if *i == 0 || !in_options {
                return true;
            }
            if arg.is_empty() {
                return false;
            }
            if !arg.to_string_lossy().starts_with('-') {
                in_options = false;
            }
            true
        })
        .map(|(_, arg)| arg)
        .collect()
}

/// Parses a decimal integer in `1..=max`.
fn parse_bounded(value: &str, max: i64) -> Result<i64, BoundError> {
    let n = value.trim_start().parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => BoundError::Overflow,
        IntErrorKind::NegOverflow => BoundError::Underflow,
        _ => BoundError::Malformed,
    })?;

    if n > max {
        Err(BoundError::Overflow)
    } else if n <= 0 {
        Err(BoundError::Underflow)
    } else {
        Ok(n)
    }
}

fn split_targets(targets: &[String]) -> Result<WorkQueue, ParseError> {
    targets
        .iter()
        .map(|token| {
            split_str('=', token)
                .map(|(path, url)| WorkItem::new(path, url))
                .ok_or_else(|| ParseError::MissingSeparator(token.clone()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(WorkQueue::from)
}

fn pair_targets(targets: &[String]) -> Result<WorkQueue, ParseError> {
    if targets.len() % 2 != 0 {
        return Err(ParseError::OddArgumentCount(targets.len()));
    }

    let items = targets
        .chunks_exact(2)
        .map(|pair| WorkItem::new(&pair[0], &pair[1]))
        .collect::<Vec<_>>();
    Ok(WorkQueue::from(items))
}
