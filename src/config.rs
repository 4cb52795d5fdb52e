//! Run configuration shared by both command-line tools.
//!
//! A [`SplitConfig`] is built once at startup and handed to
//! [`Splitter::new`](crate::splitter::Splitter::new); nothing in the pipeline
//! reads process-wide state.

use std::path::PathBuf;

use crate::constants::{DEFAULT_GZIP_LEVEL, MAX_GZIP_LEVEL, MIN_GZIP_SHARDS, MIN_PLAIN_SHARDS};
use crate::error::{Result, SplitError};
use crate::parallel::chunk_queue::Dispatch;
use crate::parallel::pipeline::PipelineConfig;
use crate::sharding::ShardNaming;

/// What kind of shards a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// Uncompressed shards, at least two of them.
    Plain,
    /// Gzip-compressed shards, at least one of them.
    Gzip { level: u32 },
}

impl SplitMode {
    /// Gzip mode with the default compression level.
    pub fn gzip() -> Self {
        SplitMode::Gzip {
            level: DEFAULT_GZIP_LEVEL,
        }
    }

    /// Smallest shard count this mode accepts.
    pub fn min_shards(&self) -> usize {
        match self {
            SplitMode::Plain => MIN_PLAIN_SHARDS,
            SplitMode::Gzip { .. } => MIN_GZIP_SHARDS,
        }
    }

    /// How shard files are named in this mode.
    pub fn naming(&self) -> ShardNaming {
        match self {
            SplitMode::Plain => ShardNaming::IndexBeforeExtension,
            SplitMode::Gzip { .. } => ShardNaming::GzipSuffix,
        }
    }
}

/// Immutable configuration of one split run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    /// File to split
    pub input: PathBuf,

    /// Directory the shards are written to; created if missing
    pub output_dir: PathBuf,

    /// Number of shards
    pub shards: usize,

    pub mode: SplitMode,

    /// Settings of the streaming dispatcher
    pub pipeline: PipelineConfig,
}

impl SplitConfig {
    /// Creates a configuration writing `shards` shards of `input` into the
    /// current directory.
    pub fn new(input: impl Into<PathBuf>, shards: usize, mode: SplitMode) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from("."),
            shards,
            mode,
            pipeline: PipelineConfig::default(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.pipeline.dispatch = dispatch;
        self
    }

    /// Checks every argument before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(SplitError::Usage("input file is required".to_string()));
        }

        let min_shards = self.mode.min_shards();
        if self.shards < min_shards {
            return Err(SplitError::Usage(format!(
                "split number must be greater than {}",
                min_shards - 1
            )));
        }

        if let SplitMode::Gzip { level } = self.mode {
            if level > MAX_GZIP_LEVEL {
                return Err(SplitError::Usage(format!(
                    "compression level must be between 0 and {}",
                    MAX_GZIP_LEVEL
                )));
            }
        }

        if self.pipeline.read_chunk_size == 0 {
            return Err(SplitError::Usage(
                "read buffer size must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.queue_capacity_factor == 0 {
            return Err(SplitError::Usage(
                "queue capacity factor must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
