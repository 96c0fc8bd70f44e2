//! Thread-safe in-memory ledger
//!
//! `MemoryLedger` implements [`LedgerStore`] on top of `DashMap`, so workers
//! handling different users never contend on a global lock.
//!
//! # Period Sums
//!
//! The sum for a period is the configured opening amount plus every saved,
//! non-incoming record of the user whose date falls in the same calendar
//! bucket as the ledger's `as_of` date. Records with an unknown date or amount
//! are kept in history but do not count toward any sum. A sum that does not
//! fit in a `Decimal` is reported as `ArithmeticOverflow`.
//!
//! # Duplicate Handling
//!
//! If a record id is saved twice for the same user, only the first copy is
//! kept (first occurrence wins).

use crate::core::traits::LedgerStore;
use crate::types::{
    MonitorError, PaymentType, Period, StorageStatus, TransactionId, TransactionRecord, UserId,
};
use chrono::NaiveDate;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct UserHistory {
    records: Vec<TransactionRecord>,
    ids: HashSet<TransactionId>,
}

/// In-memory ledger keyed by user
#[derive(Debug)]
pub struct MemoryLedger {
    /// Reference date that defines the current day, week, month and year
    as_of: NaiveDate,
    limits: DashMap<(UserId, Period), Decimal>,
    opening_spent: DashMap<(UserId, Period), Decimal>,
    histories: DashMap<UserId, UserHistory>,
}

impl MemoryLedger {
    /// Create an empty ledger whose periods are anchored at `as_of`
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            limits: DashMap::new(),
            opening_spent: DashMap::new(),
            histories: DashMap::new(),
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Configure (or replace) the limit for one user and period
    pub fn set_limit(&self, user: &str, period: Period, limit: Decimal) {
        self.limits.insert((user.to_string(), period), limit);
    }

    /// Amount already spent in the period before any record is saved here
    pub fn set_opening_spent(&self, user: &str, period: Period, spent: Decimal) {
        self.opening_spent.insert((user.to_string(), period), spent);
    }

    /// Number of records stored for `user`
    pub fn transaction_count(&self, user: &str) -> usize {
        self.histories
            .get(user)
            .map(|history| history.records.len())
            .unwrap_or(0)
    }

    fn counts_toward(&self, record: &TransactionRecord, period: Period) -> Option<Decimal> {
        if record.payment_type == PaymentType::Incoming {
            return None;
        }
        let date = record.timestamp.date()?;
        if !period.same_bucket(self.as_of, date) {
            return None;
        }
        record.amount
    }
}

impl LedgerStore for MemoryLedger {
    fn period_sum(&self, user: &str, period: Period) -> Result<Decimal, MonitorError> {
        let overflow = || {
            MonitorError::arithmetic_overflow(&format!("{} period sum", period.label()), user)
        };

        let opening = self
            .opening_spent
            .get(&(user.to_string(), period))
            .map(|entry| *entry.value())
            .unwrap_or(Decimal::ZERO);

        let Some(history) = self.histories.get(user) else {
            return Ok(opening);
        };

        let sum = history
            .records
            .iter()
            .filter_map(|record| self.counts_toward(record, period))
            .try_fold(opening, |sum, amount| sum.checked_add(amount).ok_or_else(overflow));
        sum
    }

    fn period_limit(&self, user: &str, period: Period) -> Result<Option<Decimal>, MonitorError> {
        Ok(self
            .limits
            .get(&(user.to_string(), period))
            .map(|entry| *entry.value()))
    }

    fn historical_transactions(&self, user: &str) -> Result<Vec<TransactionRecord>, MonitorError> {
        Ok(self
            .histories
            .get(user)
            .map(|history| history.records.clone())
            .unwrap_or_default())
    }

    fn save_transaction(
        &self,
        user: &str,
        record: &TransactionRecord,
    ) -> Result<StorageStatus, MonitorError> {
        let mut history = self.histories.entry(user.to_string()).or_default();

        if !history.ids.insert(record.id.clone()) {
            return Ok(StorageStatus::AlreadyStored);
        }
        history.records.push(record.clone());

        Ok(StorageStatus::Saved)
    }
}
