//! Transaction-related types for the spend monitor
//!
//! This module defines the normalized transaction record produced by the parser,
//! along with the small enums that classify a notification.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Transaction identifier as supplied in the raw notification
pub type TransactionId = String;

/// User identifier used for limit and history lookups
pub type UserId = String;

/// Text used on the wire for any field that could not be determined
pub const UNKNOWN: &str = "Unknown";

/// Text used on the wire for a record with no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Wall-clock components of the notification timestamp
///
/// Either all four fields are present (the timestamp parsed) or all four are
/// `None` (it did not). The fields are independent options so that the wire
/// shape stays `{year, month, day, hour}` with explicit nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
}

impl Timestamp {
    /// Timestamp with every component known
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Timestamp {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            hour: Some(hour),
        }
    }

    /// Timestamp for a source value that could not be parsed
    pub fn unknown() -> Self {
        Timestamp {
            year: None,
            month: None,
            day: None,
            hour: None,
        }
    }

    /// Calendar date, if the timestamp is known and forms a valid date
    pub fn date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }
}

/// Payment rail named in the notification text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PaymentMethod {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "UPI")]
    Upi,
    Unknown,
}

/// Direction of the money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Incoming,
    Outgoing,
    #[serde(rename = "Unknown")]
    Unknown,
}

/// Spending category used to group records for amount statistics
///
/// Categorization is not inferred from text yet, so the parser always
/// produces `Uncategorized`. `Named` exists for records supplied by a store
/// that does categorize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Uncategorized,
    Named(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Uncategorized => UNCATEGORIZED,
            Category::Named(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized transaction record
///
/// Created once by the parser from a raw notification and never mutated
/// afterwards. Serializes with the key names downstream consumers expect
/// (`ID`, `Amount`, `Category`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Transaction identifier, never empty
    #[serde(rename = "ID")]
    pub id: TransactionId,

    pub timestamp: Timestamp,

    /// Sender name; `None` when the notification did not carry one
    #[serde(serialize_with = "serialize_sender")]
    pub sender: Option<String>,

    pub payment_method: PaymentMethod,

    pub payment_type: PaymentType,

    /// First numeric token of the message, if any
    #[serde(rename = "Amount", with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,

    #[serde(rename = "Category")]
    pub category: Category,

    /// Free-text remainder, retained verbatim; never empty
    pub message: String,
}

fn serialize_sender<S: Serializer>(sender: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(sender.as_deref().unwrap_or(UNKNOWN))
}
