//! Batch processing with user-based partitioning
//!
//! `BatchProcessor` splits a batch of numbered lines by the user each line will
//! be attributed to. Lines of different users are processed concurrently on
//! tokio tasks; lines of one user run sequentially in input order, so every
//! decision sees exactly the history saved by the lines before it.
//!
//! ```text
//! batch ──partition_by_user──► { user → [lines...] } ──spawn per user──► results
//!                                                                  │
//!                                                        sorted by line number
//! ```

use crate::core::orchestrator::TransactionMonitor;
use crate::core::traits::LedgerStore;
use crate::io::NumberedLine;
use crate::types::{Decision, MonitorError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Outcome of one input line
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    /// 1-based line number in the input file
    pub line_no: usize,
    pub result: Result<Decision, MonitorError>,
}

/// Batch processor sharing one monitor across tasks
#[derive(Debug)]
pub struct BatchProcessor<S> {
    monitor: Arc<TransactionMonitor<S>>,
}

impl<S> Clone for BatchProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            monitor: Arc::clone(&self.monitor),
        }
    }
}

impl<S: LedgerStore + 'static> BatchProcessor<S> {
    pub fn new(monitor: Arc<TransactionMonitor<S>>) -> Self {
        Self { monitor }
    }

    /// Group lines by partition key, keeping input order within each group
    pub fn partition_by_user(&self, batch: Vec<NumberedLine>) -> HashMap<String, Vec<NumberedLine>> {
        let mut user_batches: HashMap<String, Vec<NumberedLine>> = HashMap::new();

        for line in batch {
            user_batches
                .entry(self.monitor.partition_key(&line.raw))
                .or_default()
                .push(line);
        }

        user_batches
    }

    /// Run one user's lines through the monitor in order
    pub fn process_user_lines(&self, lines: Vec<NumberedLine>) -> Vec<ProcessingResult> {
        lines
            .into_iter()
            .map(|line| ProcessingResult {
                line_no: line.line_no,
                result: self.monitor.process(&line.raw),
            })
            .collect()
    }

    /// Process a batch concurrently across users
    ///
    /// Results come back sorted by line number. A task that panics loses its
    /// lines; the panic is logged.
    pub async fn process_batch(&self, batch: Vec<NumberedLine>) -> Vec<ProcessingResult> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (_user, lines) in user_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(
                async move { processor.process_user_lines(lines) },
            ));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => error!(error = %e, "partition task failed"),
            }
        }

        results.sort_by_key(|result| result.line_no);
        results
    }
}
