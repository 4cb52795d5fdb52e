//! Gzip compressing sink built on flate2.

use std::io::{self, BufWriter, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::constants::MAX_GZIP_LEVEL;
use crate::error::{Result, SplitError};
use crate::sink::ShardSink;

/// Sink that gzip-compresses every chunk into a buffered target.
///
/// Shutdown follows [`ShardSink`] order: `flush` emits a sync-flush block,
/// `finish_codec` writes the gzip trailer, `close` flushes the target.
pub struct GzipSink<W: Write + Send> {
    encoder: GzEncoder<BufWriter<W>>,
}

impl<W: Write + Send> GzipSink<W> {
    /// Create a sink with the given compression level (0-9).
    pub fn with_level(target: W, level: u32) -> Result<Self> {
        if level > MAX_GZIP_LEVEL {
            return Err(SplitError::Usage(format!(
                "Invalid gzip compression level: {}. Must be between 0 and {}.",
                level, MAX_GZIP_LEVEL
            )));
        }

        Ok(Self {
            encoder: GzEncoder::new(BufWriter::new(target), Compression::new(level)),
        })
    }
}

impl<W: Write + Send> ShardSink for GzipSink<W> {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.encoder.write_all(chunk)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }

    fn finish_codec(&mut self) -> io::Result<()> {
        self.encoder.try_finish()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        // Already finished by `finish_codec`; finishing again only hands back the target.
        let buffered = self.encoder.finish()?;
        let mut target = buffered.into_inner().map_err(|e| e.into_error())?;
        target.flush()
    }
}
