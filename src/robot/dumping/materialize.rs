//! Re-materialization of edited cell text
//!
//! A dirty token has no trustworthy raw form, so its text is escaped for the cell style of the
//! line it is written to: anything the splitter would read as a separator is escaped, and an
//! empty value becomes the configured placeholder.

use std::borrow::Cow;

/// How cells of the target line are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Whitespace,
    Pipe,
    Tsv,
}

pub fn materialize<'a>(text: &'a str, style: CellStyle, empty_cell: &'a str) -> Cow<'a, str> {
    if text.is_empty() {
        return Cow::Borrowed(empty_cell);
    }
    let needs_escape = text.contains(['\n', '\r', '\t'])
        || text.starts_with(' ')
        || text.ends_with(' ')
        || match style {
            CellStyle::Whitespace => text.contains("  "),
            CellStyle::Pipe => text.contains(" | "),
            CellStyle::Tsv => false,
        };
    if !needs_escape {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    let chars: Vec<char> = text.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' if escapes_space(&chars, i, style) => out.push_str("\\ "),
            '|' if style == CellStyle::Pipe && i > 0 && chars[i - 1] == ' ' && chars.get(i + 1) == Some(&' ') => {
                out.push_str("\\|")
            }
            c => out.push(*c),
        }
    }
    Cow::Owned(out)
}

fn escapes_space(chars: &[char], i: usize, style: CellStyle) -> bool {
    let edge = i == 0 || i == chars.len() - 1;
    match style {
        CellStyle::Whitespace => edge || chars[i - 1] == ' ',
        CellStyle::Pipe | CellStyle::Tsv => edge,
    }
}
