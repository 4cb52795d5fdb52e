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

//! Compresses a file into N gzip shards without splitting lines.
//!
//! Usage:
//!   fastgzip -f input.log -n 4 -d out/

use std::process::ExitCode;

use clap::Parser;

use linesplit::cli::{self, CommonArgs};
use linesplit::config::{SplitConfig, SplitMode};
use linesplit::constants::DEFAULT_GZIP_LEVEL;

#[derive(Parser, Debug)]
#[command(name = "fastgzip")]
#[command(about = "Gzip a file into N independently decodable shards")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Split number. Saved as '{name}.{number}.gz' if 1 < n
    #[arg(short = 'n', long = "number", default_value_t = 1)]
    number: usize,

    /// Compression level (0-9)
    #[arg(short = 'l', long = "level", default_value_t = DEFAULT_GZIP_LEVEL)]
    level: u32,
}

fn main() -> ExitCode {
    // Quiet unless RUST_LOG asks for more; errors are reported once by `execute`.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let args: Args = cli::parse_args();
    let mode = SplitMode::Gzip { level: args.level };
    let config = SplitConfig::new(args.common.input_path(), args.number, mode)
        .with_output_dir(args.common.directory.clone())
        .with_pipeline(args.common.pipeline_config());

    cli::execute::<Args>(config)
}
