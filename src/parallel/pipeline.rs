//! Pipeline runner wiring the framer, the chunk queue and the shard workers.
//!
//! # Overview
//!
//! One producer thread frames the input into line chunks and pushes them into
//! a bounded [`ChunkQueue`]. One worker thread per shard pulls chunks from the
//! queue and writes them to the shard's sink. The queue is the only state the
//! threads share; it also carries the cancellation signal.
//!
//! The first fatal error anywhere cancels the queue. Workers blocked on an
//! empty queue and a producer blocked on a full queue both wake up and unwind,
//! every sink still goes through its ordered shutdown, and the runner returns
//! that first error.
//!
//! # Usage Examples
//!
//! ```rust
//! use linesplit::parallel::pipeline::{Pipeline, PipelineConfig, ShardTarget};
//! use linesplit::sink::PlainSink;
//!
//! let targets = vec![
//!     ShardTarget::new("first", Box::new(PlainSink::new(std::io::sink()))),
//!     ShardTarget::new("second", Box::new(PlainSink::new(std::io::sink()))),
//! ];
//!
//! let pipeline = Pipeline::new(targets, PipelineConfig::default()).unwrap();
//! let summary = pipeline.run(&b"a\nb\nc\n"[..]).unwrap();
//!
//! assert_eq!(summary.chunks_produced, 3);
//! assert_eq!(summary.shards.len(), 2);
//! ```

use std::io::Read;
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};

use crate::constants::{DEFAULT_QUEUE_CAPACITY_FACTOR, DEFAULT_READ_CHUNK_SIZE};
use crate::error::{Phase, Result, SplitError};
use crate::framer::LineFramer;
use crate::parallel::chunk_queue::{ChunkQueue, Dispatch};
use crate::parallel::worker::{ShardWorker, WorkerSummary};
use crate::sink::ShardSink;

/// Configuration for the pipeline runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Capacity of the framer's read buffer in bytes
    pub read_chunk_size: usize,

    /// Queued chunks allowed per shard before the producer blocks
    pub queue_capacity_factor: usize,

    /// How chunks are assigned to shards
    pub dispatch: Dispatch,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            queue_capacity_factor: DEFAULT_QUEUE_CAPACITY_FACTOR,
            dispatch: Dispatch::Shared,
        }
    }
}

impl PipelineConfig {
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    pub fn with_queue_capacity_factor(mut self, factor: usize) -> Self {
        self.queue_capacity_factor = factor;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }
}

/// An opened shard sink together with the label used in logs and errors.
pub struct ShardTarget {
    pub label: String,
    pub sink: Box<dyn ShardSink>,
}

impl ShardTarget {
    pub fn new(label: impl Into<String>, sink: Box<dyn ShardSink>) -> Self {
        Self {
            label: label.into(),
            sink,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub chunks_produced: u64,
    pub bytes_produced: u64,
    /// One entry per shard, in shard order
    pub shards: Vec<WorkerSummary>,
}

impl RunSummary {
    /// Total chunks written across all shards.
    pub fn chunks_written(&self) -> u64 {
        self.shards.iter().map(|s| s.chunks_written).sum()
    }

    /// Total bytes written across all shards.
    pub fn bytes_written(&self) -> u64 {
        self.shards.iter().map(|s| s.bytes_written).sum()
    }
}

/// What the production loop reports back.
struct Produced {
    chunks: u64,
    bytes: u64,
}

/// Cancels the queue if the owning thread unwinds, so no peer waits forever.
struct CancelOnPanic<'a>(&'a ChunkQueue);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            let _ = self.0.cancel();
        }
    }
}

/// A single split run over a fixed set of already opened shard sinks.
pub struct Pipeline {
    targets: Vec<ShardTarget>,
    config: PipelineConfig,
    input_label: String,
}

impl Pipeline {
    /// Create a pipeline over `targets`, one worker per target.
    ///
    /// # Returns
    /// A usage error if there are no targets.
    pub fn new(targets: Vec<ShardTarget>, config: PipelineConfig) -> Result<Self> {
        if targets.is_empty() {
            return Err(SplitError::Usage(
                "at least one shard is required".to_string(),
            ));
        }

        Ok(Self {
            targets,
            config,
            input_label: "<input>".to_string(),
        })
    }

    /// Name used for the input in read errors.
    pub fn with_input_label(mut self, label: impl Into<String>) -> Self {
        self.input_label = label.into();
        self
    }

    pub fn shard_count(&self) -> usize {
        self.targets.len()
    }

    /// Stream `input` into the shards and wait for every participant.
    ///
    /// Returns the first fatal error: a read error of the input, otherwise
    /// the first failing shard in shard order. Later errors are logged.
    pub fn run<R: Read + Send>(self, input: R) -> Result<RunSummary> {
        let Pipeline {
            targets,
            config,
            input_label,
        } = self;

        let shard_count = targets.len();
        let framer = LineFramer::with_read_chunk_size(input, config.read_chunk_size)?;
        let queue = Arc::new(ChunkQueue::for_shards(
            config.dispatch,
            shard_count,
            config.queue_capacity_factor,
        ));

        info!(
            "Splitting {} into {} shards ({:?} dispatch, queue capacity {})",
            input_label,
            shard_count,
            config.dispatch,
            queue.capacity()?
        );

        let (produced, worker_results) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(shard_count);
            for (shard, target) in targets.into_iter().enumerate() {
                let worker = ShardWorker::new(shard, target.label, target.sink, Arc::clone(&queue));
                let queue = Arc::clone(&queue);
                handles.push(scope.spawn(move || {
                    let _guard = CancelOnPanic(&queue);
                    worker.run()
                }));
            }

            let producer = scope.spawn(|| {
                let _guard = CancelOnPanic(&queue);
                produce(framer, &queue, &input_label)
            });

            let produced = producer
                .join()
                .unwrap_or_else(|_| Err(SplitError::Other("producer panicked".to_string())));

            let worker_results: Vec<Result<WorkerSummary>> = handles
                .into_iter()
                .enumerate()
                .map(|(shard, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(SplitError::Other(format!("shard worker {} panicked", shard)))
                    })
                })
                .collect();

            (produced, worker_results)
        });

        let mut errors: Vec<SplitError> = Vec::new();
        let produced = match produced {
            Ok(produced) => Some(produced),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let mut summaries = Vec::with_capacity(shard_count);
        for result in worker_results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => errors.push(e),
            }
        }

        let mut errors = errors.into_iter();
        if let Some(first) = errors.next() {
            for other in errors {
                error!("Additional failure during cancelled run: {}", other);
            }
            return Err(first);
        }

        let produced = produced.unwrap_or(Produced { chunks: 0, bytes: 0 });
        let summary = RunSummary {
            chunks_produced: produced.chunks,
            bytes_produced: produced.bytes,
            shards: summaries,
        };

        info!(
            "Split {} chunks ({} bytes) into {} shards",
            summary.chunks_produced,
            summary.bytes_produced,
            summary.shards.len()
        );
        Ok(summary)
    }
}

/// The production loop: frame the input and enqueue every chunk.
///
/// Enqueueing races against cancellation, so a run whose workers have all
/// exited can never leave the producer blocked on a full queue.
fn produce<R: Read>(
    mut framer: LineFramer<R>,
    queue: &ChunkQueue,
    input_label: &str,
) -> Result<Produced> {
    while let Some(next) = framer.next() {
        let chunk = match next {
            Ok(chunk) => chunk,
            Err(e) => {
                let e = match e {
                    SplitError::Io(source) => {
                        SplitError::stream(Phase::Read, input_label, source)
                    }
                    other => other,
                };
                error!("Reading {} failed: {}", input_label, e);
                queue.cancel()?;
                return Err(e);
            }
        };

        match queue.push_back(chunk) {
            Ok(()) => {}
            Err(SplitError::Cancelled) => {
                warn!(
                    "Run cancelled after {} chunks, producer unwinding",
                    framer.chunks_emitted()
                );
                return Ok(Produced {
                    chunks: framer.chunks_emitted(),
                    bytes: framer.bytes_emitted(),
                });
            }
            Err(e) => {
                queue.cancel()?;
                return Err(e);
            }
        }
    }

    queue.close()?;
    debug!(
        "Producer finished: {} chunks, {} bytes",
        framer.chunks_emitted(),
        framer.bytes_emitted()
    );

    Ok(Produced {
        chunks: framer.chunks_emitted(),
        bytes: framer.bytes_emitted(),
    })
}
