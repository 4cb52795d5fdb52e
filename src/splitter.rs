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

//! File-level split runs.
//!
//! The [`Splitter`] turns a validated [`SplitConfig`] into a pipeline run:
//! it rejects compressed inputs, opens the input, creates the output
//! directory, creates every shard sink (failing fast, before streaming) and
//! finally streams the input through the [`Pipeline`].
//!
//! # Example
//! ```no_run
//! use linesplit::config::{SplitConfig, SplitMode};
//! use linesplit::splitter::Splitter;
//!
//! let config = SplitConfig::new("access.log", 4, SplitMode::gzip())
//!     .with_output_dir("/tmp/shards");
//!
//! let summary = Splitter::new(config).unwrap().run().unwrap();
//! println!("wrote {} bytes", summary.bytes_written());
//! ```

use std::fs::{self, File};
use std::path::PathBuf;

use log::info;

use crate::compression::is_gzip_path;
use crate::config::{SplitConfig, SplitMode};
use crate::error::{Phase, Result, SplitError};
use crate::parallel::pipeline::{Pipeline, RunSummary, ShardTarget};
use crate::sharding::{PlainFileSharder, Sharder};

#[cfg(feature = "gzip")]
use crate::sharding::GzipFileSharder;

/// Splits one input file into shard files.
#[derive(Debug, Clone)]
pub struct Splitter {
    config: SplitConfig,
}

impl Splitter {
    /// Validates `config`. No file is touched yet.
    pub fn new(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Ordered paths of the shard files this run writes.
    pub fn output_paths(&self) -> Result<Vec<PathBuf>> {
        self.config.mode.naming().paths(
            &self.config.input,
            &self.config.output_dir,
            self.config.shards,
        )
    }

    fn sharder(&self) -> Result<Box<dyn Sharder>> {
        match self.config.mode {
            SplitMode::Plain => Ok(Box::new(PlainFileSharder)),
            #[cfg(feature = "gzip")]
            SplitMode::Gzip { level } => Ok(Box::new(GzipFileSharder::new(level))),
            #[cfg(not(feature = "gzip"))]
            SplitMode::Gzip { .. } => Err(SplitError::Unsupported(
                "gzip compression without the `gzip` feature".to_string(),
            )),
        }
    }

    /// Runs the split.
    ///
    /// Shard files created before a failure are left on disk as they are.
    pub fn run(&self) -> Result<RunSummary> {
        let input = &self.config.input;
        let input_label = input.display().to_string();

        if matches!(self.config.mode, SplitMode::Gzip { .. }) && is_gzip_path(input) {
            return Err(SplitError::Unsupported("decompression".to_string()));
        }

        let paths = self.output_paths()?;
        let sharder = self.sharder()?;

        let file = File::open(input)
            .map_err(|e| SplitError::open(Phase::Open, input_label.as_str(), e))?;

        let output_dir = &self.config.output_dir;
        if !output_dir.as_os_str().is_empty() {
            fs::create_dir_all(output_dir).map_err(|e| {
                SplitError::open(Phase::Create, output_dir.display().to_string(), e)
            })?;
            info!("Output directory {} is ready", output_dir.display());
        }

        let mut targets = Vec::with_capacity(paths.len());
        for path in &paths {
            let sink = sharder.create_sink(path)?;
            targets.push(ShardTarget::new(path.display().to_string(), sink));
        }

        info!(
            "Opened {} {:?} shards under {}",
            paths.len(),
            self.config.mode,
            output_dir.display()
        );

        Pipeline::new(targets, self.config.pipeline.clone())?
            .with_input_label(input_label)
            .run(file)
    }
}
