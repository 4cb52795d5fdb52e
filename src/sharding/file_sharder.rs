use std::fs::File;
use std::path::Path;

use log::debug;

use crate::error::{Phase, Result, SplitError};
use crate::sink::{PlainSink, ShardSink};
use crate::sharding::traits::Sharder;

#[cfg(feature = "gzip")]
use crate::compression::GzipSink;

fn create_file(path: &Path) -> Result<File> {
    debug!("Creating shard file {}", path.display());
    File::create(path).map_err(|e| SplitError::open(Phase::Create, path.display().to_string(), e))
}

/// Creates uncompressed shard files, truncating existing ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFileSharder;

impl Sharder for PlainFileSharder {
    fn create_sink(&self, path: &Path) -> Result<Box<dyn ShardSink>> {
        Ok(Box::new(PlainSink::new(create_file(path)?)))
    }
}

/// Creates gzip-compressed shard files, each a standalone gzip stream.
#[cfg(feature = "gzip")]
#[derive(Debug, Clone, Copy)]
pub struct GzipFileSharder {
    level: u32,
}

#[cfg(feature = "gzip")]
impl GzipFileSharder {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

#[cfg(feature = "gzip")]
impl Sharder for GzipFileSharder {
    fn create_sink(&self, path: &Path) -> Result<Box<dyn ShardSink>> {
        let file = create_file(path)?;
        Ok(Box::new(GzipSink::with_level(file, self.level)?))
    }
}
