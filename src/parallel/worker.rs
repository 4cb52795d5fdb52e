//! Shard worker: drains the chunk queue into one sink.
//!
//! A worker moves through `Idle -> Draining -> (Completed | Aborted)`.
//! Both terminal states run the ordered shutdown (flush, finish codec,
//! close) before the worker reports back. A local failure cancels the
//! shared queue so sibling workers and the producer stop early.

use std::sync::Arc;

use log::{debug, error, trace, warn};

use crate::error::{Phase, Result, SplitError};
use crate::parallel::chunk_queue::ChunkQueue;
use crate::sink::ShardSink;

/// Lifecycle state of a shard worker
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorkerState {
    /// Created, not yet pulling chunks
    Idle,
    /// Pulling chunks from the queue and writing them
    Draining,
    /// Queue closed and drained, sink shut down
    Completed,
    /// Stopped early because of a local failure or cancellation
    Aborted,
}

/// What a worker reports when it finishes without a local failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    /// 0-based position of the shard in the run
    pub shard: usize,
    /// Label of the shard, usually its output path
    pub label: String,
    /// Terminal state, either `Completed` or `Aborted` (cancelled by a sibling)
    pub state: WorkerState,
    pub chunks_written: u64,
    pub bytes_written: u64,
}

/// A worker that exclusively owns one shard sink.
pub struct ShardWorker {
    shard: usize,
    label: String,
    sink: Option<Box<dyn ShardSink>>,
    queue: Arc<ChunkQueue>,
    state: WorkerState,
    chunks_written: u64,
    bytes_written: u64,
}

impl ShardWorker {
    /// Creates an idle worker for shard `shard` (0-based) writing to `sink`.
    pub fn new(
        shard: usize,
        label: impl Into<String>,
        sink: Box<dyn ShardSink>,
        queue: Arc<ChunkQueue>,
    ) -> Self {
        Self {
            shard,
            label: label.into(),
            sink: Some(sink),
            queue,
            state: WorkerState::Idle,
            chunks_written: 0,
            bytes_written: 0,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Drains the queue into the sink, then shuts the sink down.
    ///
    /// Returns the first write, flush or close failure. Cancellation caused
    /// by another participant is not an error for this worker; it is reported
    /// through [`WorkerSummary::state`] as `Aborted`.
    pub fn run(mut self) -> Result<WorkerSummary> {
        debug!("Shard worker {} ({}) starting", self.shard, self.label);
        self.state = WorkerState::Draining;

        let drained = self.drain();
        let completed = matches!(drained, Ok(true));
        if let Err(e) = &drained {
            error!("Shard worker {} failed: {}", self.shard, e);
            self.cancel_run();
        }

        self.state = if completed {
            WorkerState::Completed
        } else {
            WorkerState::Aborted
        };

        let shutdown = self.shut_down();
        match (drained, shutdown) {
            (Err(e), Err(shutdown_err)) => {
                // The write error is the root cause; keep it.
                warn!(
                    "Shard worker {} also failed to shut down: {}",
                    self.shard, shutdown_err
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(_), Err(shutdown_err)) => {
                error!("Shard worker {} failed to shut down: {}", self.shard, shutdown_err);
                self.state = WorkerState::Aborted;
                self.cancel_run();
                Err(shutdown_err)
            }
            (Ok(_), Ok(())) => {
                debug!(
                    "Shard worker {} exiting in state {:?} after {} chunks",
                    self.shard, self.state, self.chunks_written
                );
                Ok(WorkerSummary {
                    shard: self.shard,
                    label: self.label,
                    state: self.state,
                    chunks_written: self.chunks_written,
                    bytes_written: self.bytes_written,
                })
            }
        }
    }

    /// Pulls and writes chunks until the queue is done.
    ///
    /// Returns Ok(true) when the queue was closed and drained, Ok(false) when
    /// the run was cancelled elsewhere.
    fn drain(&mut self) -> Result<bool> {
        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => return Err(SplitError::Other("shard sink already closed".to_string())),
        };

        loop {
            match self.queue.read_front(self.shard) {
                Ok(chunk) => {
                    trace!("Shard worker {} writing {} bytes", self.shard, chunk.len());
                    sink.write_chunk(&chunk)
                        .map_err(|e| SplitError::stream(Phase::Write, self.label.as_str(), e))?;
                    self.chunks_written += 1;
                    self.bytes_written += chunk.len() as u64;
                }
                Err(SplitError::QueueClosed(_)) => {
                    trace!("Shard worker {} found queue closed", self.shard);
                    return Ok(true);
                }
                Err(SplitError::Cancelled) => {
                    debug!("Shard worker {} observed cancellation", self.shard);
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Flush, finish the codec, close. Each step only runs if the previous succeeded.
    fn shut_down(&mut self) -> Result<()> {
        let mut sink = match self.sink.take() {
            Some(sink) => sink,
            None => return Ok(()),
        };

        sink.flush()
            .map_err(|e| SplitError::stream(Phase::Flush, self.label.as_str(), e))?;
        sink.finish_codec()
            .map_err(|e| SplitError::stream(Phase::Close, self.label.as_str(), e))?;
        sink.close()
            .map_err(|e| SplitError::stream(Phase::Close, self.label.as_str(), e))
    }

    fn cancel_run(&self) {
        if let Err(e) = self.queue.cancel() {
            error!("Shard worker {} could not cancel the run: {}", self.shard, e);
        }
    }
}
