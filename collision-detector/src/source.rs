//! JSON-lines event source
//!
//! Reads already-decoded channel events, one JSON object per line:
//!
//! ```text
//! {"channel":"CS_A","value":true,"start_time":"2024-01-01T00:00:00Z","end_time":"2024-01-01T00:00:00.000001Z"}
//! ```
//!
//! Events are yielded in file order. Time order is the producer's
//! responsibility and is not checked here.

use crate::types::{ChannelEvent, DetectorError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::Path;

/// Iterator over channel events in a JSON-lines stream
///
/// Unparseable lines (bad JSON or invalid UTF-8) yield
/// [`DetectorError::EventParse`] and reading continues. A read error from the
/// underlying reader is yielded once and ends the stream.
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a JSON-lines file
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening event file: {:?}", path);
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Read events from any buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn parse_error(&self, message: String) -> DetectorError {
        DetectorError::EventParse {
            line: self.line_number,
            message,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<ChannelEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_number += 1;

                    let line = match std::str::from_utf8(&self.buffer) {
                        Ok(line) => line.trim(),
                        Err(e) => {
                            return Some(Err(self.parse_error(format!("invalid UTF-8: {}", e))));
                        }
                    };
                    if line.is_empty() {
                        continue;
                    }

                    return Some(
                        serde_json::from_str(line).map_err(|e| self.parse_error(e.to_string())),
                    );
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(DetectorError::Io(e)));
                }
            }
        }
        None
    }
}

impl<R: BufRead> std::iter::FusedIterator for JsonLinesSource<R> {}

/// Write one record as a single JSON line
pub fn write_json_line<W: Write, T: Serialize>(writer: &mut W, record: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)
        .map_err(|e| DetectorError::Serialization(e.to_string()))?;
    writer.write_all(b"\n")?;
    Ok(())
}
