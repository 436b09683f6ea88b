//! Parsing
//!
//!     Turns a byte source into a [RobotFile](crate::robot::model::RobotFile) in one pass:
//!
//!         Reading:
//!             [LineReader](crate::robot::reading::LineReader) yields lines with their
//!             terminators and offsets; each line is split into separators and cells.
//!
//!         Mapping:
//!             Each cell becomes a token and is handed to the [mapper chain](mappers). The
//!             active [state](state) decides which mapper accepts it; mappers type the token,
//!             attach it to the model and push or pop states.
//!
//!         Finishing:
//!             Checks that need the whole file run last: required setting names, scalar-as-list
//!             variables, row descriptors (FOR loop linkage) and variable syntax.
//!
//!     Only I/O and decoding failures are errors. Everything else is collected as
//!     [ParseIssue]s and parsing always reaches the end of the input. The status of the file
//!     is FAILED when at least one ERROR issue was recorded.

pub mod comments;
pub mod context;
pub mod engine;
pub mod issues;
pub mod mappers;
pub mod post;
pub mod state;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

pub use issues::{ParseIssue, Severity, Status};
pub use state::{ParsingState, StateStack};

use crate::robot::config::RobotDataConfig;
use crate::robot::error::{ReadError, RobotError};
use crate::robot::model::RobotFile;
use crate::robot::reading::FileFormat;
use crate::robot::version::RobotVersion;

/// Declared version and file format of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub version: RobotVersion,
    pub format: FileFormat,
}

impl ParseOptions {
    pub fn new(version: RobotVersion, format: FileFormat) -> Self {
        Self { version, format }
    }

    pub fn with_version(mut self, version: RobotVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    pub fn from_config(config: &RobotDataConfig) -> Self {
        Self {
            version: config.parser.robot_version,
            format: FileFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    pub file: RobotFile,
    pub issues: Vec<ParseIssue>,
    pub status: Status,
}

impl ParseOutput {
    pub(crate) fn new(file: RobotFile, issues: Vec<ParseIssue>) -> Self {
        let status = Status::of(&issues);
        Self { file, issues, status }
    }

    pub fn is_passed(&self) -> bool {
        self.status == Status::Passed
    }

    pub fn errors(&self) -> impl Iterator<Item = &ParseIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ParseIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }
}

/// Parses any byte source.
pub fn parse_reader<R: Read>(source: R, options: &ParseOptions) -> Result<ParseOutput, ReadError> {
    engine::run(source, options)
}

/// Parses in-memory text.
pub fn parse_str(text: &str, options: &ParseOptions) -> ParseOutput {
    match engine::run(text.as_bytes(), options) {
        Ok(output) => output,
        Err(e) => unreachable!("reading valid UTF-8 from memory cannot fail: {e}"),
    }
}

/// Parses a file, taking the format from its extension.
pub fn parse_path(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParseOutput, RobotError> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path).ok_or_else(|| RobotError::UnsupportedFormat(path.to_path_buf()))?;
    let file = File::open(path).map_err(|source| RobotError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, version = %options.version, "parsing file");
    parse_reader(BufReader::new(file), &options.with_format(format)).map_err(|source| RobotError::Read {
        path: path.to_path_buf(),
        source,
    })
}
