//! Error types for linesplit.

use std::fmt;
use std::io;
use thiserror::Error;

/// The I/O phase an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Create,
    Read,
    Write,
    Flush,
    Close,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Open => "open",
            Phase::Create => "create",
            Phase::Read => "read",
            Phase::Write => "write to",
            Phase::Flush => "flush",
            Phase::Close => "close",
        };
        f.write_str(name)
    }
}

/// The main error type for linesplit operations.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Invalid or missing arguments. Raised before any I/O happens.
    #[error("{0}")]
    Usage(String),

    /// An input or output resource could not be opened or created
    /// before streaming started.
    #[error("{phase} file `{path}` failed: {source}")]
    Open {
        phase: Phase,
        path: String,
        #[source]
        source: io::Error,
    },

    /// A read, write, flush or close failed while streaming.
    #[error("{phase} file `{path}` failed: {source}")]
    Stream {
        phase: Phase,
        path: String,
        #[source]
        source: io::Error,
    },

    /// The requested operation is not implemented.
    #[error("{0} is not supported yet")]
    Unsupported(String),

    /// Occurs when attempting to interact with a closed queue.
    #[error("Queue is closed: {0}")]
    QueueClosed(String),

    /// The run was cancelled after a fatal error somewhere else.
    #[error("Run was cancelled")]
    Cancelled,

    /// An I/O error without further context.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A general error occurred.
    #[error("{0}")]
    Other(String),
}

impl SplitError {
    pub(crate) fn open(phase: Phase, path: impl Into<String>, source: io::Error) -> Self {
        SplitError::Open {
            phase,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn stream(phase: Phase, path: impl Into<String>, source: io::Error) -> Self {
        SplitError::Stream {
            phase,
            path: path.into(),
            source,
        }
    }

    /// Whether this error is queue control flow rather than a real failure.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, SplitError::QueueClosed(_) | SplitError::Cancelled)
    }
}

/// A specialized Result type for linesplit operations.
pub type Result<T> = std::result::Result<T, SplitError>;
