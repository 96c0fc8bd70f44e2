//! Asynchronous batch processing strategy
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batched line reading)
//!     └── BatchProcessor (user partitioning + tokio tasks)
//!         └── TransactionMonitor (shared, DashMap-backed ledger)
//! ```
//!
//! Batches are processed one after another so a user's lines that span batch
//! boundaries still run in input order. Within a batch, different users run in
//! parallel on the multi-threaded runtime. Results are written in line order,
//! so the output matches the sync strategy exactly.

use crate::core::batch_processor::BatchProcessor;
use crate::core::orchestrator::TransactionMonitor;
use crate::core::traits::LedgerStore;
use crate::io::async_reader::AsyncReader;
use crate::io::json_output::write_result;
use crate::strategy::{ProcessingStrategy, RunSummary};
use crate::types::MonitorError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of lines per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig, replacing zero values with defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Multi-threaded batch strategy
#[derive(Debug)]
pub struct AsyncProcessingStrategy<S> {
    monitor: Arc<TransactionMonitor<S>>,
    config: BatchConfig,
}

impl<S> AsyncProcessingStrategy<S> {
    pub fn new(monitor: Arc<TransactionMonitor<S>>, config: BatchConfig) -> Self {
        Self { monitor, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl<S: LedgerStore + 'static> ProcessingStrategy for AsyncProcessingStrategy<S> {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), MonitorError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| MonitorError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let processor = BatchProcessor::new(Arc::clone(&self.monitor));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| MonitorError::open_failed(input_path, e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut summary = RunSummary::default();
            loop {
                let batch = reader.read_batch(self.config.batch_size).await?;
                if batch.is_empty() {
                    break;
                }
                debug!(size = batch.len(), "processing batch");

                for result in processor.process_batch(batch).await {
                    summary.record(&result.result);
                    write_result(output, result.line_no, &result.result)?;
                }
            }

            output.flush()?;
            summary.log("async");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory_store::MemoryLedger;
    use crate::core::orchestrator::{MonitorConfig, UserScope};
    use crate::strategy::SyncProcessingStrategy;
    use chrono::NaiveDate;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn create_temp_input(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn monitor(scope: UserScope) -> Arc<TransactionMonitor<MemoryLedger>> {
        let ledger = MemoryLedger::new(NaiveDate::from_ymd_opt(2025, 10, 9).unwrap());
        Arc::new(TransactionMonitor::new(
            ledger,
            MonitorConfig {
                user_scope: scope,
                ..MonitorConfig::default()
            },
        ))
    }

    fn many_users_input() -> String {
        let mut input = String::new();
        for i in 0..60 {
            let user = i % 5;
            let hour = if i % 11 == 0 { 23 } else { 12 };
            let amount = if i == 47 { 5000 } else { 20 + user };
            input.push_str(&format!(
                "t{}, 2025-10-09T{:02}:00:00, Bank, sent {} via upi for user{}\n",
                i, hour, amount, user
            ));
            if i % 9 == 0 {
                input.push_str("# checkpoint\n\n");
            }
        }
        input
    }

    #[rstest]
    #[case::single_line_batches(1)]
    #[case::small_batches(7)]
    #[case::one_batch(1000)]
    fn test_async_output_matches_sync(#[case] batch_size: usize) {
        let file = create_temp_input(&many_users_input());

        let mut expected = Vec::new();
        SyncProcessingStrategy::new(monitor(UserScope::Fixed("alice".to_string())))
            .process(file.path(), &mut expected)
            .unwrap();

        let mut actual = Vec::new();
        AsyncProcessingStrategy::new(
            monitor(UserScope::Fixed("alice".to_string())),
            BatchConfig::new(batch_size, 4),
        )
        .process(file.path(), &mut actual)
        .unwrap();

        assert_eq!(String::from_utf8(actual).unwrap(), String::from_utf8(expected).unwrap());
    }

    #[test]
    fn test_async_strategy_keeps_user_order_across_batches() {
        let file = create_temp_input(&many_users_input());
        let shared = monitor(UserScope::TransactionId);

        let mut output = Vec::new();
        AsyncProcessingStrategy::new(Arc::clone(&shared), BatchConfig::new(3, 4))
            .process(file.path(), &mut output)
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 60);
        assert!(text
            .lines()
            .all(|line| line.contains("\"storage_status\":\"Transaction saved\"")));
        assert_eq!(shared.store().transaction_count("t59"), 1);
    }

    #[rstest]
    #[case::single_line_batches(1)]
    #[case::one_batch(100)]
    fn test_async_strategy_continues_past_bad_lines(#[case] batch_size: usize) {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(
            b"a1, 2025-10-09T10:00:00, Bank, sent 5 via upi\n\
              b\xff, 2025-10-09T10:00:00, Bank, sent 6 via upi\n\
              c1, 2025-10-09T10:00:00, Bank, sent 50000000000000000000000000000 via upi\n\
              c1, 2025-10-09T10:00:00, Bank, sent 50000000000000000000000000000 via upi\n\
              c2, 2025-10-09T10:00:00, Bank, sent 50000000000000000000000000000 via upi\n\
              c3, 2025-10-09T10:00:00, Bank, sent 7 via upi\n",
        )
        .unwrap();
        file.flush().unwrap();

        let scope = UserScope::Fixed("alice".to_string());
        let mut expected = Vec::new();
        SyncProcessingStrategy::new(monitor(scope.clone()))
            .process(file.path(), &mut expected)
            .unwrap();

        let mut actual = Vec::new();
        AsyncProcessingStrategy::new(monitor(scope), BatchConfig::new(batch_size, 2))
            .process(file.path(), &mut actual)
            .unwrap();

        let text = String::from_utf8(actual).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], r#"{"error":"Invalid raw data format"}"#);
        assert_eq!(
            lines[5],
            r#"{"error":"Arithmetic overflow in daily period sum for user alice"}"#
        );
        assert_eq!(text, String::from_utf8(expected).unwrap());
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(
            monitor(UserScope::TransactionId),
            BatchConfig::default(),
        );
        let mut output = Vec::new();

        let err = strategy
            .process(Path::new("nonexistent.txt"), &mut output)
            .unwrap_err();
        assert!(matches!(err, MonitorError::FileNotFound { .. }));
    }

    #[rstest]
    #[case::valid(2000, 8, 2000, 8)]
    #[case::zero_batch(0, 8, 1000, 8)]
    #[case::zero_workers(50, 0, 50, num_cpus::get())]
    fn test_batch_config_new(
        #[case] batch_size: usize,
        #[case] workers: usize,
        #[case] expected_batch: usize,
        #[case] expected_workers: usize,
    ) {
        let config = BatchConfig::new(batch_size, workers);
        assert_eq!(config.batch_size, expected_batch);
        assert_eq!(config.max_concurrent_batches, expected_workers);
    }
}
