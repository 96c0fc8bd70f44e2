//! Error types for the spend monitor
//!
//! # Error Categories
//!
//! - **Parse failures**: the raw notification does not have the expected shape.
//!   These are recoverable and surface as a rejected decision, never as a fault.
//! - **Storage failures**: the ledger could not answer a read. These propagate to
//!   the caller so that an outage is never reported as "nothing to report".
//! - **Arithmetic overflow**: a period sum left the `Decimal` range. Reported for
//!   the one notification, like a storage failure.
//! - **File errors**: input or limits files that cannot be opened or parsed.

use thiserror::Error;

/// Main error type for the spend monitor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// Fewer comma-delimited fields than the notification format requires
    #[error("Invalid raw data format: expected at least {expected} fields, found {found}")]
    InvalidFormat {
        /// Minimum number of fields
        expected: usize,
        /// Number of fields present
        found: usize,
    },

    /// A required field is present but empty
    #[error("Invalid raw data format: field '{field}' is empty")]
    EmptyField {
        /// Name of the empty field
        field: String,
    },

    /// The storage collaborator could not serve a request
    ///
    /// Distinct from a parse failure: the input was fine, the data behind it
    /// was not reachable.
    #[error("Storage unavailable during {operation} for user {user}: {message}")]
    StorageUnavailable {
        /// Ledger operation that failed
        operation: String,
        /// User the operation was for
        user: String,
        /// Description supplied by the store
        message: String,
    },

    /// A period sum does not fit in a `Decimal`
    ///
    /// Recoverable per notification: the line gets an error decision and
    /// processing continues.
    #[error("Arithmetic overflow in {operation} for user {user}")]
    ArithmeticOverflow {
        /// Computation that would overflow
        operation: String,
        /// User the computation was for
        user: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// A row of the limits file could not be used
    #[error("Limits file error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    LimitsParse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the problem
        message: String,
    },
}

impl From<std::io::Error> for MonitorError {
    fn from(error: std::io::Error) -> Self {
        MonitorError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for MonitorError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        MonitorError::LimitsParse {
            line,
            message: error.to_string(),
        }
    }
}

impl MonitorError {
    /// Create an InvalidFormat error
    pub fn invalid_format(expected: usize, found: usize) -> Self {
        MonitorError::InvalidFormat { expected, found }
    }

    /// Create an EmptyField error
    pub fn empty_field(field: &str) -> Self {
        MonitorError::EmptyField {
            field: field.to_string(),
        }
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(operation: &str, user: &str, message: impl Into<String>) -> Self {
        MonitorError::StorageUnavailable {
            operation: operation.to_string(),
            user: user.to_string(),
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, user: &str) -> Self {
        MonitorError::ArithmeticOverflow {
            operation: operation.to_string(),
            user: user.to_string(),
        }
    }

    /// Create a LimitsParse error
    pub fn limits_parse(line: Option<u64>, message: impl Into<String>) -> Self {
        MonitorError::LimitsParse {
            line,
            message: message.into(),
        }
    }

    /// Classify a failure to open `path`
    pub fn open_failed(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            MonitorError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            MonitorError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            }
        }
    }
}
