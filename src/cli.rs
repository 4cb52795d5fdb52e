//! Shared plumbing for the `splitl` and `fastgzip` binaries.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser};
use log::debug;

use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::parallel::chunk_queue::Dispatch;
use crate::parallel::pipeline::PipelineConfig;
use crate::splitter::Splitter;

/// Flags common to both tools.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Input file. Required
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Input file, as an alternative to -f
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Assign lines to shards in strict rotation for reproducible output
    #[arg(long)]
    pub round_robin: bool,

    /// Size of the input read buffer in bytes
    #[arg(long, value_name = "BYTES", default_value_t = crate::constants::DEFAULT_READ_CHUNK_SIZE)]
    pub read_buffer: usize,
}

impl CommonArgs {
    /// The input path; a positional argument wins over `-f`.
    pub fn input_path(&self) -> PathBuf {
        self.input.clone().or_else(|| self.file.clone()).unwrap_or_default()
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let dispatch = if self.round_robin {
            Dispatch::RoundRobin
        } else {
            Dispatch::Shared
        };
        PipelineConfig::default()
            .with_read_chunk_size(self.read_buffer)
            .with_dispatch(dispatch)
    }
}

/// Parses the command line, exiting with status 1 on invalid arguments.
///
/// `--help` and `--version` print and exit with status 0.
pub fn parse_args<A: Parser>() -> A {
    match A::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

/// Runs one split and maps the outcome to an exit code.
///
/// Errors are printed as a single `Error: ...` line on stderr. Usage errors
/// are followed by the tool's usage line.
pub fn execute<A: CommandFactory>(config: SplitConfig) -> ExitCode {
    match Splitter::new(config).and_then(|splitter| splitter.run()) {
        Ok(summary) => {
            debug!(
                "Wrote {} chunks ({} bytes) to {} shards",
                summary.chunks_written(),
                summary.bytes_written(),
                summary.shards.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, SplitError::Usage(_)) {
                eprintln!("{}", A::command().render_usage());
            }
            ExitCode::from(1)
        }
    }
}
