//! Output sinks owned by shard workers.
//!
//! A [`ShardSink`] receives chunks verbatim and is shut down in a fixed order:
//! [`flush`](ShardSink::flush), then [`finish_codec`](ShardSink::finish_codec),
//! then [`close`](ShardSink::close). Sinks without a compressing layer treat
//! `finish_codec` as a no-op.

use std::io::{self, BufWriter, Write};

/// A write target exclusively owned by one shard worker.
pub trait ShardSink: Send {
    /// Writes the whole chunk.
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Pushes buffered (and, for compressing sinks, codec-held) bytes down
    /// to the underlying target.
    fn flush(&mut self) -> io::Result<()>;

    /// Finishes the compressing layer, writing its trailer.
    fn finish_codec(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Closes the underlying target. Consumes the sink.
    ///
    /// Buffered bytes are written and the target is flushed, and failures
    /// of either are returned. Releasing the target itself happens on drop:
    /// `std::fs::File` has no fallible close, so an error the OS reports
    /// while closing the descriptor is not observable here.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Uncompressed sink that buffers writes to any `Write` target.
pub struct PlainSink<W: Write + Send> {
    writer: BufWriter<W>,
}

impl<W: Write + Send> PlainSink<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: BufWriter::new(target),
        }
    }
}

impl<W: Write + Send> ShardSink for PlainSink<W> {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let mut target = self.writer.into_inner().map_err(|e| e.into_error())?;
        target.flush()
    }
}
