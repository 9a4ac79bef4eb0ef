use std::io::BufRead;

use crate::errors::ImportError;

/// Line-at-a-time reader that remembers where it is.
///
/// Line terminators (`\n`, `\r\n`) are stripped, nothing else is.
pub struct LineReader<R> {
    inner: R,
    source: String,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    /// # Arguments
    ///
    /// * `inner` - the underlying reader.
    /// * `source` - name used in I/O errors, usually the file path.
    pub fn new(inner: R, source: impl Into<String>) -> Self {
        LineReader {
            inner,
            source: source.into(),
            line: 0,
        }
    }

    /// Number of the line returned last, 0 before the first read.
    pub fn line_number(&self) -> usize {
        self.line
    }

    pub fn next_line(&mut self) -> Result<Option<String>, ImportError> {
        let mut buffer = String::new();

        let read = self.inner.read_line(&mut buffer).map_err(|e| ImportError::Io {
            path: self.source.clone(),
            source: e,
        })?;

        if read == 0 {
            return Ok(None);
        }

        self.line += 1;

        if buffer.ends_with('\n') {
            buffer.pop();
            if buffer.ends_with('\r') {
                buffer.pop();
            }
        }

        Ok(Some(buffer))
    }

    /// Like [`next_line`](Self::next_line), but running out of input is an error.
    pub fn require_line(&mut self) -> Result<String, ImportError> {
        self.next_line()?.ok_or(ImportError::UnexpectedEof)
    }
}

/// Parses a line holding exactly two whitespace-separated numbers, mass then intensity.
pub fn parse_peak_line(line: &str, line_number: usize) -> Result<(f32, f32), ImportError> {
    let mut tokens = line.split_whitespace();

    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(mz), Some(intensity), None) => match (mz.parse::<f32>(), intensity.parse::<f32>()) {
            (Ok(mz), Ok(intensity)) => Ok((mz, intensity)),
            _ => Err(ImportError::MalformedPeak { line: line_number }),
        },
        _ => Err(ImportError::MalformedPeak { line: line_number }),
    }
}
