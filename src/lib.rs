//! Rust Spend Monitor Library
//! # Overview
//!
//! Screens forwarded payment notifications. Each raw line is parsed into a
//! normalized transaction record, checked against the user's spending limits,
//! scored for amount and late-night anomalies against the user's history, and
//! persisted. The result is one JSON decision per line, produced by either a
//! sync or an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Transaction records, periods, decisions and errors
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::parser`] - Raw notification parsing
//!   - [`core::alerts`] - Tiered daily, weekly, monthly and yearly limit alerts
//!   - [`core::anomaly`] - Per-category amount outliers and late-night flags
//!   - [`core::orchestrator`] - The per-notification pipeline
//!   - [`core::memory_store`] - In-memory ledger behind [`core::traits::LedgerStore`]
//! - [`io`] - Line readers, limits CSV and JSON-lines output
//! - [`strategy`] - Sync and async processing pipelines
//!
//! # Decision Shape
//!
//! ```text
//! {"cleaned_data": {...}, "alert_message": "...", "anomaly_message": "...", "storage_status": "..."}
//! {"error": "Invalid raw data format"}
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{LedgerStore, MemoryLedger, MonitorConfig, TransactionMonitor, UserScope};
pub use io::{write_decision, write_result};
pub use types::{Decision, DecisionRecord, MonitorError, TransactionRecord};
