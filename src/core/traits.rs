//! Storage collaborator abstraction
//!
//! The pure core never touches storage directly; only the orchestrator goes
//! through this trait. Implementations may be in-memory or backed by a remote
//! database, and must be shareable across worker threads.

use crate::types::{MonitorError, Period, StorageStatus, TransactionRecord};
use rust_decimal::Decimal;

/// Read/write access to a user's spending data
///
/// Every method reports collaborator-side failures as
/// `MonitorError::StorageUnavailable`. Missing data is not a failure:
/// an unknown user has zero sums, no limits and an empty history.
///
/// Concurrent calls for the same user race on read-then-append. Callers that
/// need ordering must serialize per user (the batch processor does).
pub trait LedgerStore: Send + Sync {
    /// Amount spent by `user` in the current `period`
    fn period_sum(&self, user: &str, period: Period) -> Result<Decimal, MonitorError>;

    /// Configured limit for `user` in `period`, if any
    fn period_limit(&self, user: &str, period: Period) -> Result<Option<Decimal>, MonitorError>;

    /// Previously saved records for `user`, oldest first
    fn historical_transactions(&self, user: &str) -> Result<Vec<TransactionRecord>, MonitorError>;

    /// Persist a normalized record under `user`
    fn save_transaction(
        &self,
        user: &str,
        record: &TransactionRecord,
    ) -> Result<StorageStatus, MonitorError>;
}
