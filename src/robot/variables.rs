//! Variable expressions
//!
//!     Extracts `${scalar}`, `@{list}`, `&{dict}` and `%{env}` uses from cell text into an
//!     ordered list of [Fragment]s. Names may contain nested uses (`${x${y}}`) and uses may
//!     carry item access suffixes (`${x}[${i}]`, `${d}[a][b]`).
//!
//!     Structure:
//!         - [lexeme]: logos lexer splitting text into markers, braces, brackets, backslash
//!           runs and plain text.
//!         - [fragment]: the output types.
//!         - [extractor]: depth-aware matching over lexemes, version rules and error
//!           proposals.
//!
//!     Escaping: a marker preceded by an odd number of backslashes is literal text, so `\${x}`
//!     is text and `\\${x}` is a backslash followed by a variable.
//!
//!     Version rules: before 3.2 a bare `{` inside a name does not nest (the use ends at the
//!     first `}`) and a name containing `{` or an empty name is an error. From 3.2 on bare
//!     braces nest, `${}` is accepted, and an unbalanced `{` leaves the use unterminated.

pub mod extractor;
pub mod fragment;
pub mod lexeme;

pub use extractor::{extract, extract_at, ExtractionError, ExtractionErrorKind, VariableExtractor};
pub use fragment::{Fragment, IndexExpression, TextFragment, VariableExtraction, VariableSigil, VariableUse};
