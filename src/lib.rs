//! # robot-data
//!
//! A parser and round-trip dumper for Robot Framework test data files.
//!
//! File Layout
//!
//! The crate reads `.robot`, `.txt` and `.tsv` sources into a version-aware model and writes
//! that model back to text. Everything lives under [robot]:
//!
//! src/robot
//!   ├── reading       Line reader and cell separators
//!   ├── recognizing   Version-gated token type recognizers
//!   ├── parsing       State stack, mapper chain and parse issues
//!   ├── model         File, tables, elements and rows over a token arena
//!   ├── variables     `${}` / `@{}` / `&{}` / `%{}` extraction
//!   ├── keywords      Keyword name resolution
//!   ├── dumping       Model to text
//!   └── project       Parallel parsing of several files
//!
//! For testing guidelines and curated sources, see the [testing module](robot::testing).

pub mod robot;
