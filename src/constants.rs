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

//! Constants shared by the splitting pipeline and the command-line tools.

/// Default capacity of the framer's read buffer (4 KiB).
///
/// Lines longer than this are still emitted whole; the buffer only bounds
/// a single read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Default number of queued chunks per shard.
pub const DEFAULT_QUEUE_CAPACITY_FACTOR: usize = 2;

/// Line terminator the framer splits on.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Extension appended to compressed shards. Inputs ending in it are rejected.
pub const GZIP_EXTENSION: &str = ".gz";

/// Default gzip compression level.
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

/// Highest gzip compression level accepted.
pub const MAX_GZIP_LEVEL: u32 = 9;

/// Smallest shard count the plain splitter accepts.
pub const MIN_PLAIN_SHARDS: usize = 2;

/// Smallest shard count the compressing splitter accepts.
pub const MIN_GZIP_SHARDS: usize = 1;
