use std::path::Path;

use crate::error::Result;
use crate::sink::ShardSink;

/// A trait defining how shard sinks are created.
///
/// A Sharder is asked for one sink per output path, in shard order, before
/// any data flows. Failing here aborts the run before streaming starts.
pub trait Sharder: Send + Sync {
    /// Create the sink for the shard written to `path`.
    fn create_sink(&self, path: &Path) -> Result<Box<dyn ShardSink>>;
}
