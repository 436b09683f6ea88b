//! Lexemes of variable syntax
//!
//! Every byte of the input lands in exactly one lexeme, so spans can be used to slice the
//! original text back out.
use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    /// `${`, `@{`, `&{` or `%{`
    #[regex(r"[$@&%]\{")]
    Start,

    /// A sigil not followed by `{`
    #[regex(r"[$@&%]")]
    Sigil,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[regex(r"\\+")]
    Backslashes,

    #[regex(r"[^$@&%{}\[\]\\]+")]
    Text,
}

/// Lexes `text` into `(lexeme, span)` pairs.
pub fn lex(text: &str) -> Vec<(Lexeme, Range<usize>)> {
    let mut lexer = Lexeme::lexer(text);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        // every character is covered by some rule; fall back to text regardless
        out.push((result.unwrap_or(Lexeme::Text), lexer.span()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Lexeme> {
        lex(text).into_iter().map(|(l, _)| l).collect()
    }

    #[test]
    fn start_markers_beat_bare_sigils() {
        assert_eq!(
            kinds("a${b}"),
            vec![Lexeme::Text, Lexeme::Start, Lexeme::Text, Lexeme::CloseBrace]
        );
        assert_eq!(kinds("$ 5"), vec![Lexeme::Sigil, Lexeme::Text]);
    }

    #[test]
    fn backslash_runs_are_single_lexemes() {
        let lexed = lex(r"\\\${x}");
        assert_eq!(lexed[0], (Lexeme::Backslashes, 0..3));
        assert_eq!(lexed[1].0, Lexeme::Start);
    }

    #[test]
    fn spans_cover_the_input() {
        let text = "%{a}/x[${i}]{é}";
        let covered: usize = lex(text).iter().map(|(_, span)| span.len()).sum();
        assert_eq!(covered, text.len());
    }
}
