//! Synchronous processing strategy
//!
//! Streams the input with [`LineReader`] and runs each line through the monitor
//! on the calling thread. Memory use is bounded by the ledger, not the input.

use crate::core::orchestrator::TransactionMonitor;
use crate::core::traits::LedgerStore;
use crate::io::json_output::write_result;
use crate::io::LineReader;
use crate::strategy::{ProcessingStrategy, RunSummary};
use crate::types::MonitorError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Single-threaded, line-at-a-time strategy
///
/// ```no_run
/// use chrono::NaiveDate;
/// use rust_spend_monitor::core::{MemoryLedger, MonitorConfig, TransactionMonitor};
/// use rust_spend_monitor::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let ledger = MemoryLedger::new(NaiveDate::from_ymd_opt(2025, 10, 9).unwrap());
/// let monitor = Arc::new(TransactionMonitor::new(ledger, MonitorConfig::default()));
/// let strategy = SyncProcessingStrategy::new(monitor);
///
/// strategy
///     .process(Path::new("notifications.txt"), &mut std::io::stdout())
///     .expect("Processing failed");
/// ```
#[derive(Debug)]
pub struct SyncProcessingStrategy<S> {
    monitor: Arc<TransactionMonitor<S>>,
}

impl<S> SyncProcessingStrategy<S> {
    pub fn new(monitor: Arc<TransactionMonitor<S>>) -> Self {
        Self { monitor }
    }
}

impl<S: LedgerStore> ProcessingStrategy for SyncProcessingStrategy<S> {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), MonitorError> {
        let reader = LineReader::open(input_path)?;
        let mut summary = RunSummary::default();

        for line in reader {
            let line = line?;
            let result = self.monitor.process(&line.raw);
            summary.record(&result);
            write_result(output, line.line_no, &result)?;
        }

        output.flush()?;
        summary.log("sync");
        Ok(())
    }
}
