//! I/O module
//!
//! # Components
//!
//! - `line_reader` - Synchronous notification reader with iterator interface
//! - `async_reader` - Asynchronous notification reader with batch reading interface
//! - `limits` - Spending-limits CSV loading
//! - `json_output` - JSON-lines decision output

pub mod async_reader;
pub mod json_output;
pub mod limits;
pub mod line_reader;

pub use async_reader::AsyncReader;
pub use json_output::{write_decision, write_result};
pub use limits::{load_limits, read_limits, LimitEntry};
pub use line_reader::{LineReader, NumberedLine};
