//! Main module for Robot Framework data handling

pub mod config;
pub mod dumping;
pub mod error;
pub mod keywords;
pub mod model;
pub mod parsing;
pub mod project;
pub mod reading;
pub mod recognizing;
pub mod testing;
pub mod token;
pub mod variables;
pub mod version;

pub use dumping::{dump, dump_with, DumpOptions};
pub use error::{ReadError, RobotError, VersionError};
pub use model::RobotFile;
pub use parsing::{parse_path, parse_reader, parse_str, ParseIssue, ParseOptions, ParseOutput};
pub use version::RobotVersion;
