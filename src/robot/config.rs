//! Configuration loader.
//!
//! `defaults/robot-data.default.toml` is embedded into the crate so that documented defaults and
//! runtime behavior stay in sync. Callers layer their own files and overrides on top through
//! [`Loader`] before deserializing into [`RobotDataConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

use super::version::RobotVersion;

const DEFAULT_TOML: &str = include_str!("../../defaults/robot-data.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct RobotDataConfig {
    pub parser: ParserConfig,
    pub dumper: DumperConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub robot_version: RobotVersion,
}

/// Text the dumper writes where the model has no original.
#[derive(Debug, Clone, Deserialize)]
pub struct DumperConfig {
    pub separator: String,
    pub pipe_separator: String,
    pub tsv_separator: String,
    /// `auto`, `lf`, `crlf` or `cr`.
    pub eol: String,
    pub empty_cell: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

/// Layers user files and overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Starts from the embedded `robot-data.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files fail the build.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Overrides one dotted key, e.g. `dumper.eol`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merges the layers into a [`RobotDataConfig`]. A malformed `parser.robot_version` fails here.
    pub fn build(self) -> Result<RobotDataConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in defaults alone.
pub fn load_defaults() -> Result<RobotDataConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::dumping::DumpOptions;
    use crate::robot::parsing::ParseOptions;
    use crate::robot::reading::EndOfLine;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parser.robot_version, RobotVersion::LATEST);
        assert_eq!(config.dumper.separator, "    ");
        assert_eq!(config.dumper.tsv_separator, "\t");
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(DumpOptions::from_config(&config), DumpOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parser.robot_version", "3.0")
            .expect("override to apply")
            .set_override("dumper.eol", "crlf")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(ParseOptions::from_config(&config).version, RobotVersion::new(3, 0));
        assert_eq!(DumpOptions::from_config(&config).eol, Some(EndOfLine::CrLf));
    }

    #[test]
    fn rejects_malformed_versions() {
        let result = Loader::new()
            .set_override("parser.robot_version", "three")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/robot-data.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.dumper.eol, "auto");
    }
}
