//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Normalized transaction record and its classifications
//! - `period`: Alerting periods and per-period usage
//! - `decision`: Per-notification decision output
//! - `error`: Error types for the spend monitor

pub mod decision;
pub mod error;
pub mod period;
pub mod transaction;

pub use decision::{Decision, DecisionRecord, StorageStatus, INVALID_RAW_DATA};
pub use error::MonitorError;
pub use period::{Period, PeriodUsage};
pub use transaction::{
    Category, PaymentMethod, PaymentType, Timestamp, TransactionId, TransactionRecord, UserId,
};
