//! Error types
//!
//!     Only encoding and I/O failures are errors. Everything data-shaped (bad headers,
//!     unbalanced variable braces, unknown settings) is reported as a
//!     [ParseIssue](super::parsing::ParseIssue) and parsing continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning bytes into lines. Aborts parsing of the file.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error while reading line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("invalid UTF-8 in line {line} at byte offset {offset}")]
    Decoding {
        line: usize,
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl ReadError {
    /// 1-based line on which reading failed.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            ReadError::Io { line, .. } | ReadError::Decoding { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid Robot Framework version '{0}', expected MAJOR.MINOR[.PATCH]")]
    Invalid(String),
}

/// Top-level error for the path based entry points and the CLI.
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("unsupported file type '{0}', expected .robot, .txt or .tsv")]
    UnsupportedFormat(PathBuf),

    #[error("parsing cancelled before '{0}'")]
    Cancelled(PathBuf),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("cannot write JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write YAML output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
