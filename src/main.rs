//! Spend monitor CLI
//!
//! Reads forwarded payment notifications, one per line, and writes one JSON
//! decision per notification to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- notifications.txt > decisions.jsonl
//! cargo run -- --strategy sync --limits limits.csv --as-of 2025-10-09 notifications.txt
//! cargo run -- --user alice --z-threshold 3 --late-night-start 0 notifications.txt
//! ```
//!
//! Logs go to stderr. `RUST_LOG` overrides `--verbose`, which overrides the
//! default `info` level.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (input or limits file missing or unreadable, output failure)

use rust_spend_monitor::cli;
use rust_spend_monitor::core::{MemoryLedger, TransactionMonitor};
use rust_spend_monitor::io::load_limits;
use rust_spend_monitor::strategy;
use rust_spend_monitor::types::MonitorError;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let args = cli::parse_args();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    if let Err(e) = run(&args) {
        error!(error = %e, "spend monitor failed");
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), MonitorError> {
    let as_of = args.as_of_date();
    let ledger = MemoryLedger::new(as_of);
    if let Some(path) = &args.limits_file {
        load_limits(path, &ledger)?;
    }

    let config = args.to_monitor_config();
    info!(%as_of, strategy = ?args.strategy, user_scope = ?config.user_scope, "starting");
    let monitor = Arc::new(TransactionMonitor::new(ledger, config));

    let batch_config = match args.strategy {
        cli::StrategyType::Async => Some(args.to_batch_config()),
        cli::StrategyType::Sync => None,
    };
    let strategy = strategy::create_strategy(args.strategy, monitor, batch_config);

    let stdout = std::io::stdout();
    let mut output = std::io::BufWriter::new(stdout.lock());
    strategy.process(&args.input_file, &mut output)
}
