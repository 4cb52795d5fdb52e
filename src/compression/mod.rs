//! Compressing sinks.
//!
//! Each compressed shard is a standalone stream that decodes on its own.
//! Only compression is implemented; inputs that are already compressed
//! are rejected before any work starts.

#[cfg(feature = "gzip")]
pub(crate) mod gzip;

#[cfg(feature = "gzip")]
pub use gzip::GzipSink;

use std::path::Path;

use crate::constants::GZIP_EXTENSION;

/// Whether `path` names a gzip file, judged by its extension.
pub fn is_gzip_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(GZIP_EXTENSION)
}
