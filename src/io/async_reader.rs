//! Asynchronous notification reader with batch interface
//!
//! Wraps any `futures::io::AsyncRead` (a tokio file goes through the
//! `tokio_util::compat` layer) and hands out batches of content lines with the
//! same skipping, numbering and UTF-8 rules as [`LineReader`](super::LineReader).

use crate::io::line_reader::{decode_line, NumberedLine};
use crate::types::MonitorError;
use futures::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Asynchronous line reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    reader: BufReader<R>,
    line_no: usize,
}

impl<R: AsyncRead + Unpin> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_no: 0,
        }
    }

    /// Read up to `batch_size` content lines
    ///
    /// Returns an empty batch at end of input. A read failure is fatal for the
    /// run and is returned as an error.
    pub async fn read_batch(&mut self, batch_size: usize) -> Result<Vec<NumberedLine>, MonitorError> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut bytes = Vec::new();

        while batch.len() < batch_size {
            if self.reader.read_until(b'\n', &mut bytes).await? == 0 {
                break;
            }
            self.line_no += 1;

            if let Some(line) = decode_line(self.line_no, std::mem::take(&mut bytes)) {
                batch.push(line);
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;

    fn line_numbers(batch: &[NumberedLine]) -> Vec<usize> {
        batch.iter().map(|line| line.line_no).collect()
    }

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let input = "a, 2025-10-09, App, sent 1\nb, 2025-10-09, App, sent 2\nc, 2025-10-09, App, sent 3\n";
        let mut reader = AsyncReader::new(Cursor::new(input.as_bytes()));

        let batch = reader.read_batch(2).await.unwrap();
        assert_eq!(line_numbers(&batch), vec![1, 2]);
        assert_eq!(batch[0].raw, "a, 2025-10-09, App, sent 1");

        let batch = reader.read_batch(2).await.unwrap();
        assert_eq!(line_numbers(&batch), vec![3]);

        assert!(reader.read_batch(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_input() {
        let mut reader = AsyncReader::new(Cursor::new(&b""[..]));
        assert!(reader.read_batch(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_comments_and_blanks() {
        let input = "# header\n\na, 2025-10-09, App, sent 1\n   \n# trailer\nb, 2025-10-09, App, sent 2\n";
        let mut reader = AsyncReader::new(Cursor::new(input.as_bytes()));

        let batch = reader.read_batch(10).await.unwrap();
        assert_eq!(line_numbers(&batch), vec![3, 6]);
    }

    #[tokio::test]
    async fn test_async_reader_crlf_line_endings() {
        let input = "a, 2025-10-09, App, sent 1\r\nb, 2025-10-09, App, sent 2\r\n";
        let mut reader = AsyncReader::new(Cursor::new(input.as_bytes()));

        let batch = reader.read_batch(10).await.unwrap();
        assert_eq!(batch[1].raw, "b, 2025-10-09, App, sent 2");
    }

    #[tokio::test]
    async fn test_async_reader_invalid_utf8_does_not_stop_reading() {
        let input: &[u8] = b"a, 2025-10-09, App, sent 1\n\xff\xfe\nc, 2025-10-09, App, sent 3";
        let mut reader = AsyncReader::new(Cursor::new(input));

        let batch = reader.read_batch(10).await.unwrap();
        assert_eq!(line_numbers(&batch), vec![1, 2, 3]);
        assert_eq!(batch[1].raw, "");
        assert_eq!(batch[2].raw, "c, 2025-10-09, App, sent 3");
    }
}
