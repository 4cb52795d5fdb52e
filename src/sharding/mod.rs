//! Output naming and sink creation for shards.
//!
//! [`ShardNaming`] decides where each shard is written, and a [`Sharder`]
//! opens the sink for each of those paths before streaming starts.

mod file_sharder;
mod naming;
mod traits;

pub use file_sharder::PlainFileSharder;
#[cfg(feature = "gzip")]
pub use file_sharder::GzipFileSharder;
pub use naming::ShardNaming;
pub use traits::Sharder;
