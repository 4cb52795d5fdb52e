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

//! linesplit splits a line-oriented file into N shards without ever splitting
//! a line.
//!
//! The input is framed into whole lines, pushed through a bounded queue and
//! written by one worker per shard. Shards can be plain files or standalone
//! gzip streams. Concatenating the shards (after decompression) in some order
//! reproduces the input byte for byte.
//!
//! Two binaries are built on top of the library: `splitl` for plain shards and
//! `fastgzip` for compressed ones.

pub mod cli;
pub mod compression;
pub mod config;
pub mod constants;
pub mod error;
pub mod framer;
pub mod parallel;
pub mod sharding;
pub mod sink;
pub mod splitter;

pub use config::{SplitConfig, SplitMode};
pub use error::{Result, SplitError};
pub use splitter::Splitter;
