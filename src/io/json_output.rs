//! JSON-lines output
//!
//! Every input line produces exactly one output line: the decision object, the
//! rejection object, or an error object when the ledger could not be reached or
//! a period sum overflowed.

use crate::types::{Decision, MonitorError};
use serde::Serialize;
use std::io::Write;
use tracing::error;

#[derive(Serialize)]
struct ErrorLine<'a> {
    error: &'a str,
}

/// Write one decision as a single JSON line
pub fn write_decision(output: &mut dyn Write, decision: &Decision) -> Result<(), MonitorError> {
    let json = serde_json::to_string(decision).map_err(|e| MonitorError::IoError {
        message: format!("Failed to serialize decision: {}", e),
    })?;
    writeln!(output, "{}", json)?;
    Ok(())
}

/// Write the outcome of one input line
///
/// A processing error is logged and written as `{"error": "..."}` so the
/// output stays aligned with the input.
pub fn write_result(
    output: &mut dyn Write,
    line_no: usize,
    result: &Result<Decision, MonitorError>,
) -> Result<(), MonitorError> {
    match result {
        Ok(decision) => write_decision(output, decision),
        Err(e) => {
            error!(line = line_no, error = %e, "failed to process notification");
            let json = serde_json::to_string(&ErrorLine {
                error: &e.to_string(),
            })
            .map_err(|e| MonitorError::IoError {
                message: format!("Failed to serialize error: {}", e),
            })?;
            writeln!(output, "{}", json)?;
            Ok(())
        }
    }
}
