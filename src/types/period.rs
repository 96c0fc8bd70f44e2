//! Alerting periods and per-period spending usage

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// One of the four alerting windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    /// All periods in the order alerts are reported
    pub const ALL: [Period; 4] = [Period::Daily, Period::Weekly, Period::Monthly, Period::Yearly];

    /// Lowercase adjective used inside alert sentences ("80% of daily limit reached")
    pub fn label(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// Capitalized form used at the start of a sentence ("Daily limit exceeded")
    pub fn title(&self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Yearly => "Yearly",
        }
    }

    /// Whether `date` falls in the same calendar bucket of this period as `as_of`
    ///
    /// Weeks are ISO weeks, so a week spanning a year boundary is one bucket.
    pub fn same_bucket(&self, as_of: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Period::Daily => as_of == date,
            Period::Weekly => as_of.iso_week() == date.iso_week(),
            Period::Monthly => as_of.year() == date.year() && as_of.month() == date.month(),
            Period::Yearly => as_of.year() == date.year(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(format!("Unknown period '{}'", other)),
        }
    }
}

/// Spending so far in a period together with its configured limit
///
/// `limit` is `None` when the user has no limit for the period; such a
/// period never produces an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodUsage {
    pub sum: Decimal,
    pub limit: Option<Decimal>,
}

impl PeriodUsage {
    pub fn new(sum: Decimal, limit: Option<Decimal>) -> Self {
        PeriodUsage { sum, limit }
    }
}
