//! Reading
//!
//!     Turns raw bytes into logical lines and lines into cells. Nothing here knows about
//!     tables or settings: the output is a flat sequence of lines, each with its end-of-line
//!     kind and the separators between its cells, which is exactly what the dumper needs to
//!     rebuild the original bytes.
//!
//!     1. [line_reader] splits bytes on LF, CR and CRLF (including a CRLF split across two
//!        buffer fills) and strips a leading UTF-8 BOM.
//!     2. [separators] splits a line into cells with the whitespace, pipe or TSV rules, picked
//!        by the file format (itself picked by file extension).

pub mod line_reader;
pub mod separators;

pub use line_reader::{EndOfLine, Line, LineReader};
pub use separators::{split_line, Cell, FileFormat, LinePiece, Separator, SeparatorKind, SplitLine};
