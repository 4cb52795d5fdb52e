// Copyright 2024
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Line framing for the splitting pipeline.
//!
//! The [`LineFramer`] turns any `Read` source into a sequence of line chunks.
//! Each chunk holds exactly one whole line, including its terminating newline,
//! except for a final unterminated line at end of input. Concatenating the
//! chunks in emission order reproduces the input byte for byte.
//!
//! The framer reads through a bounded buffer. A line longer than the buffer is
//! collected in a growth accumulator until its newline (or end of input) turns
//! up, so lines are never truncated or split regardless of their length.

use std::io::{self, BufRead, BufReader, Read};

use bytes::Bytes;
use log::trace;

use crate::constants::{DEFAULT_READ_CHUNK_SIZE, LINE_TERMINATOR};
use crate::error::{Result, SplitError};

/// A lazy, non-restartable iterator of line chunks over a byte source.
///
/// # Example
/// ```
/// use linesplit::framer::LineFramer;
///
/// let input: &[u8] = b"alpha\nbeta\ngamma";
/// let chunks: Vec<_> = LineFramer::new(input)
///     .collect::<linesplit::error::Result<Vec<_>>>()
///     .unwrap();
///
/// assert_eq!(chunks, vec![&b"alpha\n"[..], &b"beta\n"[..], &b"gamma"[..]]);
/// ```
pub struct LineFramer<R: Read> {
    reader: BufReader<R>,

    /// Holds the partial line while it spans more than one buffer fill.
    accumulator: Vec<u8>,

    /// Set once the source is exhausted or a read failed.
    finished: bool,

    chunks_emitted: u64,
    bytes_emitted: u64,
}

impl<R: Read> LineFramer<R> {
    /// Creates a framer with the default read buffer size.
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_READ_CHUNK_SIZE, source),
            accumulator: Vec::new(),
            finished: false,
            chunks_emitted: 0,
            bytes_emitted: 0,
        }
    }

    /// Creates a framer whose reads are bounded by `read_chunk_size` bytes.
    ///
    /// Returns a usage error for a zero-sized buffer.
    pub fn with_read_chunk_size(source: R, read_chunk_size: usize) -> Result<Self> {
        if read_chunk_size == 0 {
            return Err(SplitError::Usage(
                "read chunk size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            reader: BufReader::with_capacity(read_chunk_size, source),
            accumulator: Vec::new(),
            finished: false,
            chunks_emitted: 0,
            bytes_emitted: 0,
        })
    }

    /// Number of chunks emitted so far.
    pub fn chunks_emitted(&self) -> u64 {
        self.chunks_emitted
    }

    /// Number of bytes emitted so far.
    pub fn bytes_emitted(&self) -> u64 {
        self.bytes_emitted
    }

    /// Reads until the next newline or end of input.
    ///
    /// Returns `Ok(None)` once the source is exhausted and nothing is left
    /// in the accumulator.
    fn next_line(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            let buffer = match self.reader.fill_buf() {
                Ok(buffer) => buffer,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if buffer.is_empty() {
                // End of input. Whatever is left is an unterminated final line.
                self.finished = true;
                if self.accumulator.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.take_accumulated()));
            }

            match buffer.iter().position(|&b| b == LINE_TERMINATOR) {
                Some(end) => {
                    let line_end = end + 1;
                    let chunk = if self.accumulator.is_empty() {
                        Bytes::copy_from_slice(&buffer[..line_end])
                    } else {
                        self.accumulator.extend_from_slice(&buffer[..line_end]);
                        self.take_accumulated()
                    };
                    self.reader.consume(line_end);
                    return Ok(Some(chunk));
                }
                None => {
                    // Buffer exhausted without a newline: keep growing.
                    let consumed = buffer.len();
                    self.accumulator.extend_from_slice(buffer);
                    self.reader.consume(consumed);
                    trace!(
                        "Line spans buffer boundary, accumulated {} bytes",
                        self.accumulator.len()
                    );
                }
            }
        }
    }

    fn take_accumulated(&mut self) -> Bytes {
        Bytes::from(std::mem::take(&mut self.accumulator))
    }
}

impl<R: Read> Iterator for LineFramer<R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_line() {
            Ok(Some(chunk)) => {
                self.chunks_emitted += 1;
                self.bytes_emitted += chunk.len() as u64;
                Some(Ok(chunk))
            }
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(SplitError::Io(e)))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for LineFramer<R> {}
