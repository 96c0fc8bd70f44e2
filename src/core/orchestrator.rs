//! Transaction orchestration
//!
//! [`TransactionMonitor`] is the only component that talks to the ledger. For
//! each raw notification it:
//!
//! 1. parses the line (a malformed line yields the rejected decision)
//! 2. evaluates the spending-limit alerts for the user
//! 3. runs the anomaly detector over the user's history plus the new record
//! 4. composes the anomaly message for the new record
//! 5. hands the record to the ledger for persistence
//! 6. returns the combined decision
//!
//! Read failures in steps 2 and 3 abort with `StorageUnavailable`. A failed
//! save in step 5 is reported in the decision's storage status instead.

use crate::core::alerts::check_limits;
use crate::core::anomaly::{detect_anomalies, AnomalyConfig, AnomalyFlagSet};
use crate::core::parser;
use crate::core::traits::LedgerStore;
use crate::types::{Decision, DecisionRecord, MonitorError, TransactionRecord, UserId};
use tracing::{debug, info, warn};

/// Message when the new record is in neither flag set
pub const NO_ANOMALIES: &str = "No anomalies detected";

const ANOMALY_PREFIX: &str = "Potential anomaly detected: ";
const LATE_NIGHT_REASON: &str = "Transaction occurred at an unusual time (late night).";

/// How the user behind a notification is identified
///
/// Forwarded notifications carry no user field and the transaction id doubles
/// as the user key. `Fixed` attributes every notification to one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserScope {
    #[default]
    TransactionId,
    Fixed(UserId),
}

/// Configuration for the orchestrator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorConfig {
    pub anomaly: AnomalyConfig,
    pub user_scope: UserScope,
}

/// Parses notifications and produces one decision per line
#[derive(Debug)]
pub struct TransactionMonitor<S> {
    store: S,
    config: MonitorConfig,
}

impl<S: LedgerStore> TransactionMonitor<S> {
    pub fn new(store: S, config: MonitorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// User a raw line will be attributed to, without fully parsing it
    ///
    /// Used to keep all lines of one user on the same worker.
    pub fn partition_key(&self, raw: &str) -> String {
        match &self.config.user_scope {
            UserScope::Fixed(user) => user.clone(),
            UserScope::TransactionId => raw.split(',').next().unwrap_or_default().trim().to_string(),
        }
    }

    /// Process a raw notification, resolving the user from the configured scope
    ///
    /// # Returns
    ///
    /// * `Ok(Decision::Processed)` - the combined decision
    /// * `Ok(Decision::Rejected)` - the line is malformed
    /// * `Err(MonitorError::StorageUnavailable)` - limits or history could not be read
    pub fn process(&self, raw: &str) -> Result<Decision, MonitorError> {
        let Some(record) = parse_or_reject(raw) else {
            return Ok(Decision::invalid_format());
        };

        let user = match &self.config.user_scope {
            UserScope::Fixed(user) => user.clone(),
            UserScope::TransactionId => record.id.clone(),
        };

        self.decide(&user, record)
    }

    /// Process a raw notification on behalf of an explicit user
    pub fn process_for_user(&self, user: &str, raw: &str) -> Result<Decision, MonitorError> {
        let Some(record) = parse_or_reject(raw) else {
            return Ok(Decision::invalid_format());
        };

        self.decide(user, record)
    }

    fn decide(&self, user: &str, record: TransactionRecord) -> Result<Decision, MonitorError> {
        let alerts = check_limits(&self.store, user)?;

        let mut records = self.store.historical_transactions(user)?;
        let history_len = records.len();
        records.push(record.clone());
        let flags = detect_anomalies(&records, &self.config.anomaly);

        let storage_status = match self.store.save_transaction(user, &record) {
            Ok(status) => status.to_string(),
            Err(e) => {
                warn!(user, id = %record.id, error = %e, "failed to save transaction");
                format!("Storage failed: {}", e)
            }
        };

        info!(
            user,
            id = %record.id,
            history = history_len,
            alerts = alerts.alerts.len(),
            amount_outlier = flags.is_amount_outlier(&record.id),
            time_outlier = flags.is_time_outlier(&record.id),
            "processed notification"
        );

        Ok(Decision::Processed(DecisionRecord {
            alert_message: alerts.message(),
            anomaly_message: anomaly_message(&record, &flags),
            storage_status,
            cleaned_data: record,
        }))
    }
}

fn parse_or_reject(raw: &str) -> Option<TransactionRecord> {
    match parser::parse(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(error = %e, "rejecting notification");
            None
        }
    }
}

/// Human-readable anomaly summary for `record`
///
/// Amount reason first, then time reason; [`NO_ANOMALIES`] when neither applies.
pub fn anomaly_message(record: &TransactionRecord, flags: &AnomalyFlagSet) -> String {
    let mut reasons = Vec::new();
    if flags.is_amount_outlier(&record.id) {
        reasons.push(format!(
            "Amount is significantly higher than other '{}' expenses.",
            record.category
        ));
    }
    if flags.is_time_outlier(&record.id) {
        reasons.push(LATE_NIGHT_REASON.to_string());
    }

    if reasons.is_empty() {
        NO_ANOMALIES.to_string()
    } else {
        format!("{}{}", ANOMALY_PREFIX, reasons.join(" "))
    }
}
