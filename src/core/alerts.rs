//! Tiered spending-limit alerts
//!
//! Each period is evaluated on its own and only its highest applicable tier
//! is reported:
//!
//! | condition               | message                          |
//! |-------------------------|----------------------------------|
//! | `sum >= limit`          | `"<Period> limit exceeded"`      |
//! | `sum >= 0.8 * limit`    | `"80% of <period> limit reached"`|
//! | `sum >= 0.5 * limit`    | `"50% of <period> limit reached"`|
//!
//! All periods are reported together, daily first. A limit of zero or less can
//! only ever be exceeded; the percentage tiers are not evaluated for it.
//!
//! The alert lines of one report are joined with `\n` and the message has no
//! trailing newline. Consumers that compare against the older per-line format,
//! where every alert line ended in `\n`, must append it themselves.

use crate::core::traits::LedgerStore;
use crate::types::{MonitorError, Period, PeriodUsage};
use rust_decimal::Decimal;
use std::fmt;

/// Message returned when no period reaches any tier
pub const NO_ALERTS: &str = "No alerts";

const EIGHTY_PERCENT: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
const FIFTY_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Alert severity within one period, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertTier {
    Half,
    EightyPercent,
    Exceeded,
}

/// The tier reached by one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodAlert {
    pub period: Period,
    pub tier: AlertTier,
}

impl fmt::Display for PeriodAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tier {
            AlertTier::Exceeded => write!(f, "{} limit exceeded", self.period.title()),
            AlertTier::EightyPercent => write!(f, "80% of {} limit reached", self.period.label()),
            AlertTier::Half => write!(f, "50% of {} limit reached", self.period.label()),
        }
    }
}

/// Alerts for every period that reached a tier, in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertReport {
    pub alerts: Vec<PeriodAlert>,
}

impl AlertReport {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// One line per alert, or [`NO_ALERTS`]
    pub fn message(&self) -> String {
        if self.alerts.is_empty() {
            return NO_ALERTS.to_string();
        }
        self.alerts
            .iter()
            .map(PeriodAlert::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Highest tier reached by a single period
pub fn evaluate_period(usage: PeriodUsage) -> Option<AlertTier> {
    let limit = usage.limit?;

    if usage.sum >= limit {
        return Some(AlertTier::Exceeded);
    }

    // Percentages of a non-positive limit are not meaningful
    if limit <= Decimal::ZERO {
        return None;
    }

    if reaches(usage.sum, limit, EIGHTY_PERCENT) {
        Some(AlertTier::EightyPercent)
    } else if reaches(usage.sum, limit, FIFTY_PERCENT) {
        Some(AlertTier::Half)
    } else {
        None
    }
}

// A positive limit scaled by a fraction below one cannot overflow
fn reaches(sum: Decimal, limit: Decimal, fraction: Decimal) -> bool {
    limit
        .checked_mul(fraction)
        .is_some_and(|threshold| sum >= threshold)
}

/// Evaluate every period independently and collect the alerts
pub fn evaluate<I>(usages: I) -> AlertReport
where
    I: IntoIterator<Item = (Period, PeriodUsage)>,
{
    let alerts = usages
        .into_iter()
        .filter_map(|(period, usage)| {
            evaluate_period(usage).map(|tier| PeriodAlert { period, tier })
        })
        .collect();

    AlertReport { alerts }
}

/// Fetch the four period sums and limits for `user` and evaluate them
///
/// # Errors
///
/// Returns `MonitorError::StorageUnavailable` if the ledger cannot answer.
/// A user without configured limits is not an error; the report is empty.
pub fn check_limits<S>(store: &S, user: &str) -> Result<AlertReport, MonitorError>
where
    S: LedgerStore + ?Sized,
{
    let mut usages = Vec::with_capacity(Period::ALL.len());
    for period in Period::ALL {
        let sum = store.period_sum(user, period)?;
        let limit = store.period_limit(user, period)?;
        usages.push((period, PeriodUsage::new(sum, limit)));
    }

    Ok(evaluate(usages))
}
