use crate::core::anomaly::AnomalyConfig;
use crate::core::orchestrator::{MonitorConfig, UserScope};
use crate::strategy::BatchConfig;
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Screen forwarded payment notifications for limit breaches and anomalies
#[derive(Parser, Debug)]
#[command(name = "spend-monitor")]
#[command(
    about = "Screen payment notifications for spending-limit alerts and anomalies",
    long_about = None
)]
pub struct CliArgs {
    /// Input file with one raw notification per line
    #[arg(value_name = "INPUT", help = "Path to the notifications file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for synchronous or 'async' for asynchronous"
    )]
    pub strategy: StrategyType,

    /// Number of lines per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of lines per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Spending limits CSV
    #[arg(
        long = "limits",
        value_name = "FILE",
        help = "CSV with columns user,period,limit[,spent]"
    )]
    pub limits_file: Option<PathBuf>,

    /// Attribute every notification to this user
    #[arg(
        long = "user",
        value_name = "ID",
        help = "User for all notifications (default: the transaction id)"
    )]
    pub user: Option<String>,

    /// Reference date for the current day, week, month and year
    #[arg(
        long = "as-of",
        value_name = "YYYY-MM-DD",
        help = "Reference date for period sums (default: today)"
    )]
    pub as_of: Option<NaiveDate>,

    #[arg(
        long = "z-threshold",
        value_name = "K",
        help = "Standard deviations above the category mean for an amount outlier (default: 2.0)"
    )]
    pub z_threshold: Option<f64>,

    #[arg(
        long = "min-category-size",
        value_name = "N",
        help = "Fewest amounts in a category before outliers are flagged (default: 5)"
    )]
    pub min_category_size: Option<usize>,

    #[arg(
        long = "late-night-start",
        value_name = "HOUR",
        help = "First hour of the late-night window (default: 23)"
    )]
    pub late_night_start: Option<u32>,

    #[arg(
        long = "late-night-end",
        value_name = "HOUR",
        help = "First hour after the late-night window (default: 5)"
    )]
    pub late_night_end: Option<u32>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// BatchConfig from the CLI, defaults where unset
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    pub fn to_anomaly_config(&self) -> AnomalyConfig {
        let default = AnomalyConfig::default();
        AnomalyConfig::new(
            self.z_threshold.unwrap_or(default.z_threshold),
            self.min_category_size
                .unwrap_or(default.min_category_size),
            self.late_night_start.unwrap_or(default.late_night_start),
            self.late_night_end.unwrap_or(default.late_night_end),
        )
    }

    pub fn user_scope(&self) -> UserScope {
        match &self.user {
            Some(user) => UserScope::Fixed(user.clone()),
            None => UserScope::TransactionId,
        }
    }

    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            anomaly: self.to_anomaly_config(),
            user_scope: self.user_scope(),
        }
    }

    /// `--as-of`, or today's local date
    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}
