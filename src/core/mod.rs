//! Core business logic module
//!
//! - `parser` - Raw notification parsing
//! - `alerts` - Tiered spending-limit alerts
//! - `anomaly` - Amount and late-night outlier detection
//! - `traits` - Storage collaborator abstraction
//! - `memory_store` - Thread-safe in-memory ledger
//! - `orchestrator` - Per-notification decision pipeline
//! - `batch_processor` - User-partitioned concurrent processing

pub mod alerts;
pub mod anomaly;
pub mod batch_processor;
pub mod memory_store;
pub mod orchestrator;
pub mod parser;
pub mod traits;

pub use alerts::{check_limits, AlertReport, AlertTier, PeriodAlert, NO_ALERTS};
pub use anomaly::{detect_anomalies, AnomalyConfig, AnomalyFlagSet};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use memory_store::MemoryLedger;
pub use orchestrator::{MonitorConfig, TransactionMonitor, UserScope, NO_ANOMALIES};
pub use traits::LedgerStore;
