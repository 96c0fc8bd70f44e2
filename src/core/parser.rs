//! Raw notification parser
//!
//! Turns one forwarded notification line into a normalized [`TransactionRecord`].
//!
//! # Input Format
//!
//! ```text
//! id, ISO-8601-timestamp, applicationName[, sender], freeTextMessage
//! ```
//!
//! The line is split into at most five fields, so the message may itself
//! contain commas. The application name is accepted for shape compatibility
//! and dropped.
//!
//! # Inference
//!
//! Payment method, payment type and amount come from the message text by
//! case-insensitive keyword search and a leftmost numeric match. The amount is
//! simply the first number in the text, so a date or quantity written before
//! the amount is picked up instead.

use crate::types::{
    Category, MonitorError, PaymentMethod, PaymentType, Timestamp, TransactionRecord,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

/// Upper bound on top-level fields; the last one keeps any further commas
pub const MAX_FIELDS: usize = 5;

/// Fewest fields a well-formed notification can have (no sender)
pub const MIN_FIELDS: usize = 4;

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+\.?[0-9]*").expect("invalid amount regex"))
}

/// Parse a raw notification line
///
/// # Returns
///
/// * `Ok(TransactionRecord)` - fully populated record; only the timestamp
///   components and the amount may be `None`
/// * `Err(MonitorError::InvalidFormat)` - fewer than four fields
/// * `Err(MonitorError::EmptyField)` - the id or message is blank
///
/// An unparseable timestamp is not an error: the record is produced with
/// [`Timestamp::unknown`].
pub fn parse(raw: &str) -> Result<TransactionRecord, MonitorError> {
    let parts: Vec<&str> = raw.splitn(MAX_FIELDS, ',').map(str::trim).collect();

    let (id, raw_timestamp, sender, message) = match parts.as_slice() {
        [id, timestamp, _application, sender, message] => (*id, *timestamp, *sender, *message),
        [id, timestamp, _application, message] => (*id, *timestamp, "", *message),
        _ => return Err(MonitorError::invalid_format(MIN_FIELDS, parts.len())),
    };

    if id.is_empty() {
        return Err(MonitorError::empty_field("id"));
    }
    if message.is_empty() {
        return Err(MonitorError::empty_field("message"));
    }

    Ok(TransactionRecord {
        id: id.to_string(),
        timestamp: parse_timestamp(raw_timestamp),
        sender: (!sender.is_empty()).then(|| sender.to_string()),
        payment_method: infer_payment_method(message),
        payment_type: infer_payment_type(message),
        amount: extract_amount(message),
        category: Category::Uncategorized,
        message: message.to_string(),
    })
}

/// Decompose an ISO-8601 timestamp into wall-clock fields
///
/// Accepts RFC 3339 with an offset (fields are taken as written, not
/// converted to UTC), naive date-times with `T` or space separators and
/// optional seconds, and a bare date (hour 0).
pub fn parse_timestamp(raw: &str) -> Timestamp {
    match parse_iso_datetime(raw.trim()) {
        Some(dt) => Timestamp::new(dt.year(), dt.month(), dt.day(), dt.hour()),
        None => {
            debug!(timestamp = raw, "unparseable timestamp, leaving components empty");
            Timestamp::unknown()
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// First match wins: "credit" before "upi"
pub fn infer_payment_method(message: &str) -> PaymentMethod {
    let lower = message.to_lowercase();
    if lower.contains("credit") {
        PaymentMethod::Credit
    } else if lower.contains("upi") {
        PaymentMethod::Upi
    } else {
        PaymentMethod::Unknown
    }
}

/// First match wins: incoming keywords before outgoing keywords
pub fn infer_payment_type(message: &str) -> PaymentType {
    let lower = message.to_lowercase();
    if lower.contains("incoming") || lower.contains("received") {
        PaymentType::Incoming
    } else if lower.contains("outgoing") || lower.contains("sent") {
        PaymentType::Outgoing
    } else {
        PaymentType::Unknown
    }
}

/// Leftmost run of digits with an optional decimal part
///
/// No currency or thousands-separator handling: "1,234.50" yields 1.
pub fn extract_amount(message: &str) -> Option<Decimal> {
    let token = amount_re().find(message)?.as_str();
    // "50." is a complete match of the pattern but not a decimal literal
    let token = token.trim_end_matches('.');

    match Decimal::from_str(token) {
        Ok(amount) => Some(amount),
        Err(e) => {
            debug!(token, error = %e, "numeric token does not fit an amount");
            None
        }
    }
}
