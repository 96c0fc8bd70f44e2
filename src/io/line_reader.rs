//! Synchronous notification reader with iterator interface
//!
//! Streams an input file one line at a time. Blank lines and lines whose first
//! non-blank character is `#` are skipped, but line numbers keep counting them
//! so results can be traced back to the file. A line that is not valid UTF-8
//! is still handed out, with empty text, so it is rejected like any other
//! malformed notification instead of ending the run.
//!
//! ```no_run
//! use rust_spend_monitor::io::LineReader;
//! use std::path::Path;
//!
//! let reader = LineReader::open(Path::new("notifications.txt")).unwrap();
//! for line in reader {
//!     let line = line.unwrap();
//!     println!("{}: {}", line.line_no, line.raw);
//! }
//! ```

use crate::types::MonitorError;
use std::fs::File;
use std::io::{BufRead, BufReader, Split};
use std::path::Path;
use tracing::warn;

/// One content line of the input and its 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub line_no: usize,
    pub raw: String,
}

/// Whether a line carries a notification
pub fn is_content_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Decode one line read as bytes, or `None` if it is not a content line
///
/// A trailing `\n` or `\r\n` is dropped.
pub(crate) fn decode_line(line_no: usize, mut bytes: Vec<u8>) -> Option<NumberedLine> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }

    match String::from_utf8(bytes) {
        Ok(raw) if is_content_line(&raw) => Some(NumberedLine { line_no, raw }),
        Ok(_) => None,
        Err(e) => {
            warn!(line = line_no, error = %e, "notification is not valid UTF-8");
            Some(NumberedLine {
                line_no,
                raw: String::new(),
            })
        }
    }
}

/// Iterator over the content lines of a buffered reader
#[derive(Debug)]
pub struct LineReader<R> {
    lines: Split<R>,
    line_no: usize,
}

impl LineReader<BufReader<File>> {
    /// Open `path` for streaming
    ///
    /// # Errors
    ///
    /// `MonitorError::FileNotFound` if the path does not exist, `IoError` for
    /// any other open failure.
    pub fn open(path: &Path) -> Result<Self, MonitorError> {
        let file = File::open(path).map_err(|e| MonitorError::open_failed(path, e))?;
        Ok(Self::new(BufReader::with_capacity(8 * 1024, file)))
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<NumberedLine, MonitorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bytes = match self.lines.next()? {
                Ok(bytes) => bytes,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if let Some(line) = decode_line(self.line_no, bytes) {
                return Some(Ok(line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[rstest]
    #[case::notification("u1, 2025-10-09, App, sent 5", true)]
    #[case::blank("", false)]
    #[case::whitespace("   \t", false)]
    #[case::comment("# header", false)]
    #[case::indented_comment("   # note", false)]
    #[case::hash_inside("u1, 2025-10-09, App, order #42", true)]
    fn test_is_content_line(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_content_line(line), expected);
    }

    #[test]
    fn test_skips_blank_and_comment_lines_but_counts_them() {
        let input = "# notifications\n\na, 2025-10-09, App, sent 1\r\n  \nb, 2025-10-09, App, sent 2";
        let lines: Vec<NumberedLine> = LineReader::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            lines,
            vec![
                NumberedLine {
                    line_no: 3,
                    raw: "a, 2025-10-09, App, sent 1".to_string()
                },
                NumberedLine {
                    line_no: 5,
                    raw: "b, 2025-10-09, App, sent 2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_passed_through() {
        let lines: Vec<NumberedLine> = LineReader::new(Cursor::new("bad,input\n"))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw, "bad,input");
    }

    #[test]
    fn test_open_reads_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "a, 2025-10-09, App, sent 1").unwrap();
        file.flush().unwrap();

        let reader = LineReader::open(file.path()).unwrap();
        assert_eq!(reader.count(), 1);
    }

    #[test]
    fn test_open_missing_file() {
        let err = LineReader::open(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(matches!(err, MonitorError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_utf8_line_is_handed_out_empty() {
        let bytes: &[u8] = b"ok, 2025-10-09, App, sent 1\n\xff\xfe\r\nnext, 2025-10-09, App, sent 2\n";
        let lines: Vec<NumberedLine> = LineReader::new(Cursor::new(bytes))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            lines,
            vec![
                NumberedLine {
                    line_no: 1,
                    raw: "ok, 2025-10-09, App, sent 1".to_string()
                },
                NumberedLine {
                    line_no: 2,
                    raw: String::new()
                },
                NumberedLine {
                    line_no: 3,
                    raw: "next, 2025-10-09, App, sent 2".to_string()
                },
            ]
        );
    }

    #[rstest]
    #[case::lf(b"a, b, c, d\n".to_vec(), Some("a, b, c, d"))]
    #[case::crlf(b"a, b, c, d\r\n".to_vec(), Some("a, b, c, d"))]
    #[case::no_terminator(b"a, b, c, d".to_vec(), Some("a, b, c, d"))]
    #[case::blank(b"\r\n".to_vec(), None)]
    #[case::comment(b"# note\n".to_vec(), None)]
    #[case::undecodable(b"\xc3\x28\n".to_vec(), Some(""))]
    fn test_decode_line(#[case] bytes: Vec<u8>, #[case] expected: Option<&str>) {
        let decoded = decode_line(7, bytes);
        assert_eq!(decoded.as_ref().map(|line| line.raw.as_str()), expected);
        assert!(decoded.iter().all(|line| line.line_no == 7));
    }
}
