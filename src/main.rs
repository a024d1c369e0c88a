mod cli;
mod downloader;
mod error;
mod parser;
mod report;
mod scheduler;
mod transfer;
mod types;

use anyhow::Context;
use clap::CommandFactory;
use colored::*;
use error::ParseError;
use log::{debug, error, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let (config, queue) = match parser::parse_args(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(ParseError::NoArguments) => {
            let _ = cli::Cli::command().print_help();
            return ExitCode::from(1);
        }
        Err(ParseError::Cli(e)) => {
            // --help and --version land here as well.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
        Err(e) => {
            error!("Failed to parse arguments: {}", e);
            eprintln!("{} {}", "massget:".red(), e);
            return ExitCode::from(1);
        }
    };
    info!(
        "Starting {} transfers: parallel={} timeout={}ms",
        queue.len(),
        config.max_parallel,
        config.timeout_ms
    );
    for item in queue.iter() {
        debug!("Target: {} -> {}", item.source_url, item.destination_path.display());
    }

    let transport = match downloader::HttpTransport::new().context("Failed to build HTTP client") {
        Ok(transport) => transport,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "massget:".red(), e);
            return ExitCode::from(1);
        }
    };

    scheduler::run(&config, &queue, &transport, report::print_status).await;
    ExitCode::SUCCESS
}
