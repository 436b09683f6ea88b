//! Variable extractor
//!
//!     Walks the lexemes of a text once. On an unescaped start marker it looks for the
//!     matching `}` with a depth counter (nested markers always nest, bare `{` nests from 3.2),
//!     then recurses into the name and any `[...]` suffixes. A marker that never closes is
//!     reported with a proposal that appends the missing braces, and the rest of the text is
//!     kept as literal.

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

use super::fragment::{
    Fragment, IndexExpression, TextFragment, VariableExtraction, VariableSigil, VariableUse,
};
use super::lexeme::{lex, Lexeme};
use crate::robot::token::FilePosition;
use crate::robot::version::RobotVersion;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ExtractionErrorKind {
    #[error("unterminated variable, {missing} closing brace(s) missing")]
    Unterminated { missing: usize },

    #[error("empty variable name")]
    EmptyName,

    #[error("variable name contains an unmatched '{{'")]
    UnmatchedBrace,
}

/// Malformed variable syntax, with a best-effort corrected form.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} in '{text}'{}", proposal_suffix(.proposal))]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    /// Offending source text.
    pub text: String,
    pub position: FilePosition,
    pub proposal: Option<String>,
}

fn proposal_suffix(proposal: &Option<String>) -> String {
    proposal
        .as_ref()
        .map(|p| format!(", did you mean '{p}'?"))
        .unwrap_or_default()
}

/// Version-aware extractor. Cheap to construct and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableExtractor {
    version: RobotVersion,
}

impl VariableExtractor {
    pub fn new(version: RobotVersion) -> Self {
        Self { version }
    }

    pub fn extract(&self, text: &str) -> VariableExtraction {
        self.extract_at(text, FilePosition::start())
    }

    /// Extracts with fragment positions translated from `base`, the position of the text's
    /// first byte in its file.
    pub fn extract_at(&self, text: &str, base: FilePosition) -> VariableExtraction {
        let lexemes = lex(text);
        let mut scan = Scan {
            text,
            lexemes: &lexemes,
            base,
            braces_nest: self.version.is_at_least(3, 2),
            empty_allowed: self.version.is_at_least(3, 2),
            errors: Vec::new(),
        };
        let fragments = scan.fragments(0, lexemes.len());
        VariableExtraction {
            fragments,
            errors: scan.errors,
        }
    }
}

pub fn extract(text: &str, version: RobotVersion) -> VariableExtraction {
    VariableExtractor::new(version).extract(text)
}

pub fn extract_at(text: &str, base: FilePosition, version: RobotVersion) -> VariableExtraction {
    VariableExtractor::new(version).extract_at(text, base)
}

struct Scan<'a> {
    text: &'a str,
    lexemes: &'a [(Lexeme, Range<usize>)],
    base: FilePosition,
    braces_nest: bool,
    empty_allowed: bool,
    errors: Vec<ExtractionError>,
}

impl<'a> Scan<'a> {
    fn start_of(&self, idx: usize) -> usize {
        self.lexemes
            .get(idx)
            .map_or(self.text.len(), |(_, span)| span.start)
    }

    fn kind(&self, idx: usize) -> Lexeme {
        self.lexemes[idx].0
    }

    fn escaped(&self, idx: usize) -> bool {
        idx > 0
            && matches!(&self.lexemes[idx - 1], (Lexeme::Backslashes, span) if span.len() % 2 == 1)
    }

    fn position(&self, byte: usize) -> FilePosition {
        self.base.advanced(byte)
    }

    fn fragments(&mut self, from: usize, to: usize) -> Vec<Fragment> {
        let mut out = Vec::new();
        let mut text_start = self.start_of(from);
        let mut i = from;
        while i < to {
            if self.kind(i) == Lexeme::Start && !self.escaped(i) {
                match self.closing_brace(i, to) {
                    Ok(close) => {
                        self.push_text(&mut out, text_start, self.start_of(i));
                        let (variable, next) = self.variable(i, close, to);
                        out.push(Fragment::Variable(variable));
                        i = next;
                        text_start = self.start_of(i);
                        continue;
                    }
                    Err(missing) => {
                        self.unterminated(i, to, missing);
                        break;
                    }
                }
            }
            i += 1;
        }
        self.push_text(&mut out, text_start, self.start_of(to));
        out
    }

    fn push_text(&self, out: &mut Vec<Fragment>, start: usize, end: usize) {
        if end > start {
            out.push(Fragment::Text(TextFragment {
                text: self.text[start..end].to_string(),
                position: self.position(start),
            }));
        }
    }

    /// Index of the `}` closing the marker at `start`, or the number of missing braces.
    fn closing_brace(&self, start: usize, to: usize) -> Result<usize, usize> {
        let mut depth = 1;
        for k in start + 1..to {
            if self.escaped(k) {
                continue;
            }
            match self.kind(k) {
                Lexeme::Start => depth += 1,
                Lexeme::OpenBrace if self.braces_nest => depth += 1,
                Lexeme::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(k);
                    }
                }
                _ => {}
            }
        }
        Err(depth)
    }

    fn closing_bracket(&self, open: usize, to: usize) -> Option<usize> {
        let mut depth = 1;
        for k in open + 1..to {
            if self.escaped(k) {
                continue;
            }
            match self.kind(k) {
                Lexeme::OpenBracket => depth += 1,
                Lexeme::CloseBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(k);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn variable(&mut self, start: usize, close: usize, to: usize) -> (VariableUse, usize) {
        let marker = self.start_of(start);
        let sigil = self.text[marker..]
            .chars()
            .next()
            .and_then(VariableSigil::from_char)
            .unwrap_or(VariableSigil::Scalar);
        let name = self.text[marker + 2..self.start_of(close)].to_string();
        let name_fragments = self.fragments(start + 1, close);

        let mut indices = Vec::new();
        let mut next = close + 1;
        if sigil != VariableSigil::Environment {
            while next < to && self.kind(next) == Lexeme::OpenBracket && !self.escaped(next) {
                let Some(end) = self.closing_bracket(next, to) else {
                    break;
                };
                let open_byte = self.start_of(next);
                indices.push(IndexExpression {
                    text: self.text[open_byte + 1..self.start_of(end)].to_string(),
                    fragments: self.fragments(next + 1, end),
                    position: self.position(open_byte),
                });
                next = end + 1;
            }
        }

        let text = self.text[marker..self.start_of(next)].to_string();
        let position = self.position(marker);
        self.validate_name(sigil, &name, start + 1..close, &text, position);

        let variable = VariableUse {
            sigil,
            text,
            name,
            name_fragments,
            indices,
            position,
        };
        (variable, next)
    }

    fn validate_name(
        &mut self,
        sigil: VariableSigil,
        name: &str,
        name_lexemes: Range<usize>,
        text: &str,
        position: FilePosition,
    ) {
        if name.is_empty() && !self.empty_allowed {
            self.errors.push(ExtractionError {
                kind: ExtractionErrorKind::EmptyName,
                text: text.to_string(),
                position,
                proposal: None,
            });
            return;
        }
        let bare_brace = name_lexemes
            .clone()
            .any(|k| self.kind(k) == Lexeme::OpenBrace && !self.escaped(k));
        if bare_brace && !self.braces_nest {
            let suffix = &text[name.len() + 3..];
            self.errors.push(ExtractionError {
                kind: ExtractionErrorKind::UnmatchedBrace,
                text: text.to_string(),
                position,
                proposal: Some(format!(
                    "{}{{{}}}{}",
                    sigil.as_char(),
                    name.replace('{', "\\{"),
                    suffix
                )),
            });
        }
    }

    fn unterminated(&mut self, start: usize, to: usize, missing: usize) {
        let marker = self.start_of(start);
        let found = &self.text[marker..self.start_of(to)];
        self.errors.push(ExtractionError {
            kind: ExtractionErrorKind::Unterminated { missing },
            text: found.to_string(),
            position: self.position(marker),
            proposal: Some(format!("{found}{}", "}".repeat(missing))),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V31: RobotVersion = RobotVersion::new(3, 1);
    const V32: RobotVersion = RobotVersion::new(3, 2);

    fn texts(extraction: &VariableExtraction) -> Vec<&str> {
        extraction.fragments.iter().map(Fragment::text).collect()
    }

    #[test]
    fn nested_use_inside_name() {
        let extraction = extract("${x${y}}", V32);
        assert!(extraction.is_valid());
        assert!(extraction.is_single_variable());
        let outer = extraction.variables().next().unwrap();
        assert_eq!(outer.name, "x${y}");
        let nested: Vec<_> = outer.nested_uses().map(|v| v.name.as_str()).collect();
        assert_eq!(nested, vec!["y"]);
        assert_eq!(outer.nested_uses().next().unwrap().position.offset, 3);
    }

    #[test]
    fn environment_paths_replace_each_use() {
        let extraction = extract("%{a}/%{b}/%{c}/file.txt", V31);
        assert_eq!(extraction.variables().count(), 3);
        assert!(extraction
            .variables()
            .all(|v| v.sigil == VariableSigil::Environment));
        assert_eq!(texts(&extraction), vec!["%{a}", "/", "%{b}", "/", "%{c}", "/file.txt"]);
        let replaced = extraction.replace_with(|v| match v.name.as_str() {
            "a" => Some("home".to_string()),
            "b" => Some("user".to_string()),
            _ => None,
        });
        assert_eq!(replaced, "home/user/%{c}/file.txt");
    }

    #[test]
    fn unterminated_use_proposes_closing_brace() {
        let extraction = extract("${x", V32);
        assert!(!extraction.has_variables());
        assert_eq!(texts(&extraction), vec!["${x"]);
        let error = &extraction.errors[0];
        assert_eq!(error.kind, ExtractionErrorKind::Unterminated { missing: 1 });
        assert_eq!(error.proposal.as_deref(), Some("${x}"));
        assert!(error.to_string().contains("did you mean '${x}'"));
    }

    #[test]
    fn odd_backslashes_escape_markers() {
        let escaped = extract(r"\${x}", V32);
        assert!(!escaped.has_variables());
        assert_eq!(texts(&escaped), vec![r"\${x}"]);

        let literal_backslash = extract(r"\\${x}", V32);
        assert_eq!(texts(&literal_backslash), vec![r"\\", "${x}"]);

        let three = extract(r"\\\@{x}", V32);
        assert!(!three.has_variables());
    }

    #[test]
    fn index_suffixes_may_hold_variables() {
        let extraction = extract("${x}[${i}] and &{d}[a][b]", V32);
        let uses: Vec<_> = extraction.variables().collect();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].text, "${x}[${i}]");
        assert_eq!(uses[0].indices[0].text, "${i}");
        assert!(uses[0].indices[0].fragments[0].as_variable().is_some());
        assert_eq!(uses[1].indices.len(), 2);
        assert_eq!(uses[1].base_text(), "&{d}");
    }

    #[test]
    fn environment_variables_take_no_index() {
        let extraction = extract("%{HOME}[0]", V32);
        assert_eq!(texts(&extraction), vec!["%{HOME}", "[0]"]);
    }

    #[test]
    fn unclosed_index_is_text() {
        let extraction = extract("${x}[0", V32);
        assert_eq!(texts(&extraction), vec!["${x}", "[0"]);
    }

    #[test]
    fn empty_name_depends_on_version() {
        assert!(extract("${}", V32).is_valid());
        let old = extract("${}", V31);
        assert_eq!(old.errors[0].kind, ExtractionErrorKind::EmptyName);
    }

    #[test]
    fn bare_brace_in_name_depends_on_version() {
        let old = extract("${a{b}", V31);
        assert_eq!(old.variables().next().unwrap().name, "a{b");
        assert_eq!(old.errors[0].kind, ExtractionErrorKind::UnmatchedBrace);
        assert_eq!(old.errors[0].proposal.as_deref(), Some(r"${a\{b}"));

        let new = extract("${a{b}", V32);
        assert_eq!(new.errors[0].kind, ExtractionErrorKind::Unterminated { missing: 1 });
        assert_eq!(new.errors[0].proposal.as_deref(), Some("${a{b}}"));

        let balanced = extract("${a{b}}", V32);
        assert!(balanced.is_valid());
        assert_eq!(balanced.variables().next().unwrap().name, "a{b}");
    }

    #[test]
    fn positions_are_absolute() {
        let extraction = extract_at("Log ${x}", FilePosition::new(3, 4, 40), V32);
        let variable = extraction.variables().next().unwrap();
        assert_eq!(variable.position, FilePosition::new(3, 8, 44));
        assert_eq!(extraction.fragments[0].position(), FilePosition::new(3, 4, 40));
    }

    #[test]
    fn lone_sigils_are_text() {
        let extraction = extract("costs $5 @ home", V32);
        assert!(!extraction.has_variables());
        assert_eq!(texts(&extraction), vec!["costs $5 @ home"]);
    }
}
