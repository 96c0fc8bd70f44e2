//! Spending-limits CSV
//!
//! ```text
//! user,period,limit,spent
//! alice,daily,100.00,
//! alice,monthly,2000,1250.50
//! ```
//!
//! `period` is one of daily, weekly, monthly or yearly (any case). `spent` is
//! optional and seeds the amount already spent in the current period. Later
//! rows for the same user and period replace earlier ones.

use crate::core::memory_store::MemoryLedger;
use crate::types::{MonitorError, Period, UserId};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Row as it appears in the file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LimitsCsvRecord {
    pub user: String,
    pub period: String,
    pub limit: String,
    pub spent: Option<String>,
}

/// Validated limit configuration for one user and period
#[derive(Debug, Clone, PartialEq)]
pub struct LimitEntry {
    pub user: UserId,
    pub period: Period,
    pub limit: Decimal,
    pub spent: Option<Decimal>,
}

fn parse_amount(field: &str, value: &str, line: Option<u64>) -> Result<Decimal, MonitorError> {
    Decimal::from_str(value.trim())
        .map_err(|_| MonitorError::limits_parse(line, format!("invalid {} '{}'", field, value)))
}

/// Validate one CSV row
pub fn convert_limits_record(
    record: LimitsCsvRecord,
    line: Option<u64>,
) -> Result<LimitEntry, MonitorError> {
    if record.user.trim().is_empty() {
        return Err(MonitorError::limits_parse(line, "empty user"));
    }

    let period =
        Period::from_str(&record.period).map_err(|e| MonitorError::limits_parse(line, e))?;
    let limit = parse_amount("limit", &record.limit, line)?;
    let spent = match record.spent {
        Some(spent) if !spent.trim().is_empty() => Some(parse_amount("spent", &spent, line)?),
        _ => None,
    };

    Ok(LimitEntry {
        user: record.user.trim().to_string(),
        period,
        limit,
        spent,
    })
}

/// Parse every row of a limits CSV
///
/// The first bad row aborts the load; a partially applied limits file would
/// silently under-report alerts.
pub fn read_limits<R: Read>(reader: R) -> Result<Vec<LimitEntry>, MonitorError> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut row = StringRecord::new();
    let mut entries = Vec::new();

    while csv_reader.read_record(&mut row)? {
        let line = row.position().map(|pos| pos.line());
        let record: LimitsCsvRecord = row.deserialize(Some(&headers))?;
        entries.push(convert_limits_record(record, line)?);
    }

    Ok(entries)
}

/// Install limits and opening amounts into the ledger
pub fn apply_limits(ledger: &MemoryLedger, entries: &[LimitEntry]) {
    for entry in entries {
        ledger.set_limit(&entry.user, entry.period, entry.limit);
        if let Some(spent) = entry.spent {
            ledger.set_opening_spent(&entry.user, entry.period, spent);
        }
    }
}

/// Read the limits file at `path` and install it into `ledger`
///
/// Returns the number of rows applied.
pub fn load_limits(path: &Path, ledger: &MemoryLedger) -> Result<usize, MonitorError> {
    let file = File::open(path).map_err(|e| MonitorError::open_failed(path, e))?;
    let entries = read_limits(file)?;
    apply_limits(ledger, &entries);

    info!(path = %path.display(), rows = entries.len(), "loaded spending limits");
    Ok(entries.len())
}
