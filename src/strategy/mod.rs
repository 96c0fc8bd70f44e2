//! Processing strategy module
//!
//! A strategy owns the whole pipeline for one input file: reading lines,
//! running them through a [`TransactionMonitor`] and writing one JSON decision
//! per line. Sync and async implementations produce identical output and can be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::orchestrator::TransactionMonitor;
use crate::core::traits::LedgerStore;
use crate::types::{Decision, MonitorError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Complete processing pipeline for one input file
pub trait ProcessingStrategy: Send + Sync {
    /// Process every notification in `input_path` and write decisions to `output`
    ///
    /// Decisions are written in input order, one line per content line.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be opened or read, or output cannot
    /// be written. Per-line failures (malformed lines, ledger outages) are
    /// written to the output and do not stop processing.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), MonitorError>;
}

/// Create a processing strategy sharing `monitor`
///
/// `config` is ignored by the sync strategy.
pub fn create_strategy<S>(
    strategy_type: StrategyType,
    monitor: Arc<TransactionMonitor<S>>,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy>
where
    S: LedgerStore + 'static,
{
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(monitor)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            monitor,
            config.unwrap_or_default(),
        )),
    }
}

/// Per-run counters, logged once processing completes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &Result<Decision, MonitorError>) {
        match result {
            Ok(Decision::Processed(_)) => self.processed += 1,
            Ok(Decision::Rejected { .. }) => self.rejected += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn log(&self, strategy: &str) {
        info!(
            strategy,
            processed = self.processed,
            rejected = self.rejected,
            failed = self.failed,
            "processing complete"
        );
    }
}
