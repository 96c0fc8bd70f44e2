//! Decision records emitted once per processed notification

use super::transaction::TransactionRecord;
use serde::Serialize;
use std::fmt;

/// Error text of a rejected decision; part of the output contract
pub const INVALID_RAW_DATA: &str = "Invalid raw data format";

/// Outcome reported by the ledger when a record is handed over for persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    /// The record was appended to the user's history
    Saved,
    /// A record with the same id was already stored; the first copy is kept
    AlreadyStored,
}

impl fmt::Display for StorageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageStatus::Saved => f.write_str("Transaction saved"),
            StorageStatus::AlreadyStored => f.write_str("Transaction already stored"),
        }
    }
}

/// Combined result for one notification
///
/// Constructed once by the orchestrator and handed to the caller; field
/// names are a compatibility boundary for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub cleaned_data: TransactionRecord,
    pub alert_message: String,
    pub anomaly_message: String,
    pub storage_status: String,
}

/// Either a full decision or the explicit rejection of malformed input
///
/// Serialized untagged, so a rejection is exactly `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Decision {
    Processed(DecisionRecord),
    Rejected { error: String },
}

impl Decision {
    /// The rejection emitted for a notification that failed to parse
    pub fn invalid_format() -> Self {
        Decision::Rejected {
            error: INVALID_RAW_DATA.to_string(),
        }
    }
}
