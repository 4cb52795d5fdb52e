
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::parallel::pipeline::ShardTarget;
use crate::sink::ShardSink;

/// In-memory sink whose contents stay inspectable after the run.
#[derive(Clone, Default)]
pub(crate) struct MemorySink {
    pub data: Arc<Mutex<Vec<u8>>>,
    pub chunks: Arc<Mutex<Vec<Vec<u8>>>>,
    pub closed: Arc<Mutex<bool>>,
}

impl MemorySink {
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }

    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl ShardSink for MemorySink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.data.lock().unwrap().extend_from_slice(chunk);
        self.chunks.lock().unwrap().push(chunk.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

/// Sink that accepts `writes_before_failure` chunks, then fails every write.
#[derive(Clone)]
pub(crate) struct FailingSink {
    pub writes_before_failure: usize,
    pub writes: Arc<AtomicUsize>,
    pub closed: Arc<Mutex<bool>>,
}

impl FailingSink {
    pub fn new(writes_before_failure: usize) -> Self {
        Self {
            writes_before_failure,
            writes: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(Mutex::new(false)),
        }
    }
}

impl ShardSink for FailingSink {
    fn write_chunk(&mut self, _chunk: &[u8]) -> io::Result<()> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.writes_before_failure {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

/// Builds `count` memory sinks and the targets that write into them.
pub(crate) fn memory_targets(count: usize) -> (Vec<MemorySink>, Vec<ShardTarget>) {
    let sinks: Vec<MemorySink> = (0..count).map(|_| MemorySink::default()).collect();
    let targets = sinks
        .iter()
        .enumerate()
        .map(|(i, sink)| ShardTarget::new(format!("shard-{}", i + 1), Box::new(sink.clone())))
        .collect();
    (sinks, targets)
}

/// Numbered lines `0\n1\n...`.
pub(crate) fn numbered_lines(count: usize) -> Vec<u8> {
    (0..count).flat_map(|i| format!("{}\n", i).into_bytes()).collect()
}

/// Splits bytes into lines, keeping terminators.
pub(crate) fn lines_of(data: &[u8]) -> Vec<Vec<u8>> {
    data.split_inclusive(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
}
