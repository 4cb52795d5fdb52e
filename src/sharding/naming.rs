use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::GZIP_EXTENSION;
use crate::error::{Result, SplitError};

/// Naming scheme for shard output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardNaming {
    /// `{dir}/{stem}.{i}{.ext}` for every shard `i` in `1..=n`.
    ///
    /// `data.txt` split in two becomes `data.1.txt` and `data.2.txt`.
    IndexBeforeExtension,

    /// `{dir}/{name}.gz` for a single shard, `{dir}/{name}.{i}.gz` otherwise.
    ///
    /// `data.txt` split in two becomes `data.txt.1.gz` and `data.txt.2.gz`.
    GzipSuffix,
}

impl ShardNaming {
    /// Ordered output paths for `shards` shards of `input` inside `output_dir`.
    pub fn paths(&self, input: &Path, output_dir: &Path, shards: usize) -> Result<Vec<PathBuf>> {
        let file_name = input.file_name().ok_or_else(|| {
            SplitError::Usage(format!(
                "input `{}` does not name a file",
                input.display()
            ))
        })?;

        let names: Vec<OsString> = match self {
            ShardNaming::IndexBeforeExtension => {
                let stem = input.file_stem().unwrap_or(file_name);
                let extension = input.extension();
                (1..=shards)
                    .map(|i| {
                        let mut name = stem.to_os_string();
                        name.push(format!(".{}", i));
                        if let Some(extension) = extension {
                            name.push(".");
                            name.push(extension);
                        }
                        name
                    })
                    .collect()
            }
            ShardNaming::GzipSuffix if shards == 1 => {
                let mut name = file_name.to_os_string();
                name.push(GZIP_EXTENSION);
                vec![name]
            }
            ShardNaming::GzipSuffix => (1..=shards)
                .map(|i| {
                    let mut name = file_name.to_os_string();
                    name.push(format!(".{}{}", i, GZIP_EXTENSION));
                    name
                })
                .collect(),
        };

        Ok(names.into_iter().map(|name| output_dir.join(name)).collect())
    }
}
