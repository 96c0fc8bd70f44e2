//! Per-category amount outliers and late-night transactions
//!
//! The detector is stateless: every call recomputes its statistics from the
//! records it is given (a user's history plus the new record). Records are
//! de-duplicated by id before anything else, keeping the first occurrence.
//!
//! # Amount Outliers
//!
//! Records are partitioned by category. A partition with fewer than
//! `min_category_size` known amounts is statistically meaningless and none of
//! its members are flagged. Otherwise a record is flagged when its amount is
//! strictly greater than `mean + z_threshold * std_dev` (population standard
//! deviation) of its partition.
//!
//! # Time Outliers
//!
//! A record is flagged when its hour falls in the late-night window. Records
//! with an unknown hour are never flagged.

use crate::types::{Category, TransactionId, TransactionRecord};
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// Tunables for the anomaly detector
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyConfig {
    /// Standard deviations above the mean before an amount is an outlier
    pub z_threshold: f64,
    /// Smallest partition (known amounts) that gets amount statistics
    pub min_category_size: usize,
    /// First hour of the late-night window
    pub late_night_start: u32,
    /// First hour after the late-night window
    pub late_night_end: u32,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.0,
            min_category_size: 5,
            late_night_start: 23,
            late_night_end: 5,
        }
    }
}

impl AnomalyConfig {
    /// Create a config, replacing invalid values with their defaults
    pub fn new(
        z_threshold: f64,
        min_category_size: usize,
        late_night_start: u32,
        late_night_end: u32,
    ) -> Self {
        let default = Self::default();

        let z_threshold = if z_threshold.is_finite() && z_threshold > 0.0 {
            z_threshold
        } else {
            warn!(
                z_threshold,
                default = default.z_threshold,
                "invalid z_threshold, using default"
            );
            default.z_threshold
        };

        let min_category_size = if min_category_size >= 2 {
            min_category_size
        } else {
            warn!(
                min_category_size,
                default = default.min_category_size,
                "min_category_size below 2, using default"
            );
            default.min_category_size
        };

        let (late_night_start, late_night_end) = if late_night_start < 24 && late_night_end < 24 {
            (late_night_start, late_night_end)
        } else {
            warn!(
                late_night_start,
                late_night_end, "late-night hours must be 0-23, using default window"
            );
            (default.late_night_start, default.late_night_end)
        };

        Self {
            z_threshold,
            min_category_size,
            late_night_start,
            late_night_end,
        }
    }

    /// Whether `hour` is inside the late-night window
    ///
    /// The window wraps midnight when start > end; start == end disables it.
    pub fn is_late_night(&self, hour: u32) -> bool {
        let (start, end) = (self.late_night_start, self.late_night_end);
        if start > end {
            hour >= start || hour < end
        } else {
            start <= hour && hour < end
        }
    }
}

/// Ids flagged by one detection run
///
/// The two sets are independent; a record may be in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnomalyFlagSet {
    pub amount_outlier_ids: BTreeSet<TransactionId>,
    pub time_outlier_ids: BTreeSet<TransactionId>,
}

impl AnomalyFlagSet {
    pub fn is_amount_outlier(&self, id: &str) -> bool {
        self.amount_outlier_ids.contains(id)
    }

    pub fn is_time_outlier(&self, id: &str) -> bool {
        self.time_outlier_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.amount_outlier_ids.is_empty() && self.time_outlier_ids.is_empty()
    }
}

/// Streaming mean and variance (Welford)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn population_std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).sqrt()
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::default();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

/// Flag amount and time outliers among `records`
pub fn detect_anomalies(records: &[TransactionRecord], config: &AnomalyConfig) -> AnomalyFlagSet {
    let unique = dedupe_by_id(records);

    AnomalyFlagSet {
        amount_outlier_ids: amount_outliers(&unique, config),
        time_outlier_ids: time_outliers(&unique, config),
    }
}

fn dedupe_by_id(records: &[TransactionRecord]) -> Vec<&TransactionRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.id.as_str()))
        .collect()
}

fn amount_outliers(records: &[&TransactionRecord], config: &AnomalyConfig) -> BTreeSet<TransactionId> {
    let mut partitions: BTreeMap<&Category, Vec<(&str, f64)>> = BTreeMap::new();
    for record in records {
        let Some(amount) = record.amount.and_then(|amount| amount.to_f64()) else {
            continue;
        };
        partitions
            .entry(&record.category)
            .or_default()
            .push((record.id.as_str(), amount));
    }

    let mut flagged = BTreeSet::new();
    for (category, members) in partitions {
        if members.len() < config.min_category_size {
            debug!(
                %category,
                size = members.len(),
                "partition too small for amount statistics"
            );
            continue;
        }

        let stats: RunningStats = members.iter().map(|(_, amount)| *amount).collect();
        let threshold = stats.mean() + config.z_threshold * stats.population_std_dev();

        flagged.extend(
            members
                .into_iter()
                .filter(|(_, amount)| *amount > threshold)
                .map(|(id, _)| id.to_string()),
        );
    }

    flagged
}

fn time_outliers(records: &[&TransactionRecord], config: &AnomalyConfig) -> BTreeSet<TransactionId> {
    records
        .iter()
        .filter(|record| {
            record
                .timestamp
                .hour
                .is_some_and(|hour| config.is_late_night(hour))
        })
        .map(|record| record.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, PaymentType, Timestamp};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn record(id: &str, amount: Option<i64>, hour: Option<u32>) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            timestamp: match hour {
                Some(hour) => Timestamp::new(2025, 10, 9, hour),
                None => Timestamp::unknown(),
            },
            sender: None,
            payment_method: PaymentMethod::Upi,
            payment_type: PaymentType::Outgoing,
            amount: amount.map(|a| Decimal::new(a, 0)),
            category: Category::Uncategorized,
            message: "sent".to_string(),
        }
    }

    fn in_category(mut record: TransactionRecord, name: &str) -> TransactionRecord {
        record.category = Category::Named(name.to_string());
        record
    }

    fn ids(values: &[&str]) -> BTreeSet<TransactionId> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_flags_amount_far_above_category_mean() {
        let mut records: Vec<_> = (0..5)
            .map(|i| record(&format!("t{}", i), Some(10), Some(12)))
            .collect();
        records.push(record("big", Some(100), Some(12)));

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert_eq!(flags.amount_outlier_ids, ids(&["big"]));
        assert!(flags.time_outlier_ids.is_empty());
    }

    #[test]
    fn test_small_partition_is_never_flagged() {
        let records = vec![
            record("a", Some(10), Some(12)),
            record("b", Some(10), Some(12)),
            record("c", Some(10), Some(12)),
            record("huge", Some(100_000), Some(12)),
        ];

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert!(flags.amount_outlier_ids.is_empty());
    }

    #[test]
    fn test_identical_amounts_are_not_outliers() {
        let records: Vec<_> = (0..10)
            .map(|i| record(&format!("t{}", i), Some(42), Some(12)))
            .collect();

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert!(flags.is_empty());
    }

    #[test]
    fn test_categories_are_evaluated_separately() {
        let mut records: Vec<_> = (0..6)
            .map(|i| in_category(record(&format!("rent{}", i), Some(2000), Some(12)), "Rent"))
            .collect();
        records.extend((0..6).map(|i| record(&format!("food{}", i), Some(20), Some(12))));

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert!(flags.amount_outlier_ids.is_empty());
    }

    #[test]
    fn test_null_amount_and_null_hour_are_never_flagged() {
        let mut records: Vec<_> = (0..5)
            .map(|i| record(&format!("t{}", i), Some(10), Some(12)))
            .collect();
        records.push(record("no_amount", None, Some(2)));
        records.push(record("no_hour", Some(10), None));

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert!(!flags.is_amount_outlier("no_amount"));
        assert!(!flags.is_time_outlier("no_hour"));
        assert!(flags.is_time_outlier("no_amount"));
    }

    #[test]
    fn test_null_amounts_do_not_count_toward_partition_size() {
        let mut records: Vec<_> = (0..3)
            .map(|i| record(&format!("t{}", i), Some(10), Some(12)))
            .collect();
        records.extend((0..5).map(|i| record(&format!("blank{}", i), None, Some(12))));
        records.push(record("big", Some(1000), Some(12)));

        // "big" clears one sigma, but only four amounts are known
        let config = AnomalyConfig::new(1.0, 5, 23, 5);
        let flags = detect_anomalies(&records, &config);
        assert!(flags.amount_outlier_ids.is_empty());

        records.push(record("t3", Some(10), Some(12)));
        let flags = detect_anomalies(&records, &config);
        assert_eq!(flags.amount_outlier_ids, ids(&["big"]));
    }

    #[rstest]
    #[case::first_copy_small(10, 1000, false)]
    #[case::first_copy_large(1000, 10, true)]
    fn test_duplicate_ids_use_first_occurrence(
        #[case] first: i64,
        #[case] second: i64,
        #[case] flagged: bool,
    ) {
        let mut records: Vec<_> = (0..5)
            .map(|i| record(&format!("t{}", i), Some(10), Some(12)))
            .collect();
        records.push(record("dup", Some(first), Some(12)));
        records.push(record("dup", Some(second), Some(12)));

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert_eq!(flags.is_amount_outlier("dup"), flagged);
        assert_eq!(flags.amount_outlier_ids.len(), usize::from(flagged));
    }

    #[test]
    fn test_duplicate_ids_use_first_occurrence_for_time() {
        let records = vec![record("dup", Some(10), Some(12)), record("dup", Some(10), Some(2))];

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert!(flags.time_outlier_ids.is_empty());
    }

    #[test]
    fn test_record_can_be_both_amount_and_time_outlier() {
        let mut records: Vec<_> = (0..5)
            .map(|i| record(&format!("t{}", i), Some(10), Some(12)))
            .collect();
        records.push(record("late_big", Some(500), Some(3)));

        let flags = detect_anomalies(&records, &AnomalyConfig::default());
        assert!(flags.is_amount_outlier("late_big"));
        assert!(flags.is_time_outlier("late_big"));
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_anomalies(&[], &AnomalyConfig::default()).is_empty());
    }

    #[rstest]
    #[case::midnight(0, true)]
    #[case::four_am(4, true)]
    #[case::five_am(5, false)]
    #[case::noon(12, false)]
    #[case::ten_pm(22, false)]
    #[case::eleven_pm(23, true)]
    fn test_default_late_night_window(#[case] hour: u32, #[case] expected: bool) {
        assert_eq!(AnomalyConfig::default().is_late_night(hour), expected);
    }

    #[rstest]
    #[case::non_wrapping(1, 4, 2, true)]
    #[case::non_wrapping_end_exclusive(1, 4, 4, false)]
    #[case::disabled(3, 3, 3, false)]
    fn test_custom_late_night_window(
        #[case] start: u32,
        #[case] end: u32,
        #[case] hour: u32,
        #[case] expected: bool,
    ) {
        let config = AnomalyConfig::new(2.0, 5, start, end);
        assert_eq!(config.is_late_night(hour), expected);
    }

    #[rstest]
    #[case::negative_z(-1.0, 5, 23, 5)]
    #[case::nan_z(f64::NAN, 5, 23, 5)]
    #[case::tiny_partition(2.0, 1, 23, 5)]
    #[case::hour_out_of_range(2.0, 5, 24, 5)]
    fn test_invalid_config_falls_back_to_defaults(
        #[case] z: f64,
        #[case] min_size: usize,
        #[case] start: u32,
        #[case] end: u32,
    ) {
        assert_eq!(AnomalyConfig::new(z, min_size, start, end), AnomalyConfig::default());
    }

    #[test]
    fn test_running_stats() {
        let stats: RunningStats = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-9);
        assert!((stats.population_std_dev() - 2.0).abs() < 1e-9);
        assert_eq!(RunningStats::default().population_std_dev(), 0.0);
    }
}
