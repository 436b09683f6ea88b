//! Cell separators
//!
//!     Splits one logical line into separators and cells. The strategy depends on the file
//!     format and, for `.robot`/`.txt`, on the line itself:
//!
//!     - Whitespace: a run of spaces/tabs separates cells when it contains a tab or is at least
//!       two characters long. Single spaces never split. Leading and trailing runs are always
//!       separators so cell text never carries edge whitespace, but a single leading space
//!       does not indent the row.
//!     - Pipe: used when the line starts with `|`. A pipe separates cells when it sits at the
//!       start of the line or after whitespace, and is followed by whitespace or the end of the
//!       line.
//!     - TSV: every tab is a separator, nothing else is.
//!
//!     Empty cells before the first and after the last non-empty cell (pipe and TSV rows like
//!     `|    | Log |`) are folded into the edge separators. A leading separator therefore means
//!     the row is indented.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Declared file format, chosen purely by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FileFormat {
    #[default]
    Robot,
    Txt,
    Tsv,
}

impl FileFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "robot" => Some(FileFormat::Robot),
            "txt" => Some(FileFormat::Txt),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn is_tsv(self) -> bool {
        self == FileFormat::Tsv
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeparatorKind {
    Whitespace,
    Pipe,
    Tab,
}

/// Separator text between (or around) cells. `start`/`end` are byte columns in the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Separator {
    pub kind: SeparatorKind,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Cell text. May be empty for pipe and TSV rows with blank inner cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LinePiece {
    Separator(Separator),
    Cell(Cell),
}

impl LinePiece {
    pub fn start(&self) -> usize {
        match self {
            LinePiece::Separator(s) => s.start,
            LinePiece::Cell(c) => c.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            LinePiece::Separator(s) => s.end,
            LinePiece::Cell(c) => c.end,
        }
    }
}

/// Result of splitting one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitLine {
    pub pieces: Vec<LinePiece>,
    pub kind: SeparatorKind,
}

impl SplitLine {
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.pieces.iter().filter_map(|p| match p {
            LinePiece::Cell(c) => Some(c),
            LinePiece::Separator(_) => None,
        })
    }

    pub fn separators(&self) -> impl Iterator<Item = &Separator> {
        self.pieces.iter().filter_map(|p| match p {
            LinePiece::Separator(s) => Some(s),
            LinePiece::Cell(_) => None,
        })
    }

    pub fn has_cells(&self) -> bool {
        self.cells().next().is_some()
    }

    /// A row is indented when something precedes its first cell. On pipe rows the opening
    /// `| ` does not count, only folded empty cells (`|    | Log`) do. A single leading space
    /// is stripped from the cell but does not indent.
    pub fn is_indented(&self) -> bool {
        let Some(LinePiece::Separator(leading)) = self.pieces.first() else {
            return false;
        };
        if !self.has_cells() {
            return false;
        }
        match self.kind {
            SeparatorKind::Pipe => leading.text.matches('|').count() > 1,
            SeparatorKind::Whitespace => leading.text.len() >= 2 || leading.text.contains('\t'),
            SeparatorKind::Tab => true,
        }
    }
}

/// True when the pipe strategy applies to this line.
pub fn is_pipe_line(line: &str, format: FileFormat) -> bool {
    if format.is_tsv() {
        return false;
    }
    let mut chars = line.chars();
    chars.next() == Some('|') && chars.next().map_or(true, |c| c == ' ' || c == '\t')
}

/// Splits `line` into interleaved separators and cells.
pub fn split_line(line: &str, format: FileFormat) -> SplitLine {
    let (kind, raw) = if format.is_tsv() {
        (SeparatorKind::Tab, split_tsv(line))
    } else if is_pipe_line(line, format) {
        (SeparatorKind::Pipe, split_pipes(line))
    } else {
        (SeparatorKind::Whitespace, split_whitespace(line))
    };
    SplitLine {
        pieces: fold_edge_cells(raw, kind),
        kind,
    }
}

fn separator(kind: SeparatorKind, line: &str, start: usize, end: usize) -> LinePiece {
    LinePiece::Separator(Separator {
        kind,
        start,
        end,
        text: line[start..end].to_string(),
    })
}

fn cell(line: &str, start: usize, end: usize) -> LinePiece {
    LinePiece::Cell(Cell {
        start,
        end,
        text: line[start..end].to_string(),
    })
}

/// Builds pieces from separator spans. Cells are emitted between separators even when empty.
fn interleave(line: &str, kind: SeparatorKind, spans: &[(usize, usize)]) -> Vec<LinePiece> {
    let mut pieces = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for (i, &(start, end)) in spans.iter().enumerate() {
        // no empty cell before a leading separator
        if start > cursor || (i > 0 && start == cursor) {
            pieces.push(cell(line, cursor, start));
        }
        pieces.push(separator(kind, line, start, end));
        cursor = end;
    }
    if cursor < line.len() {
        pieces.push(cell(line, cursor, line.len()));
    }
    pieces
}

fn split_whitespace(line: &str) -> Vec<LinePiece> {
    let spans: Vec<(usize, usize)> = WHITESPACE_RUN
        .find_iter(line)
        .filter(|m| {
            let run = m.as_str();
            m.start() == 0 || m.end() == line.len() || run.len() >= 2 || run.contains('\t')
        })
        .map(|m| (m.start(), m.end()))
        .collect();
    interleave(line, SeparatorKind::Whitespace, &spans)
}

fn split_tsv(line: &str) -> Vec<LinePiece> {
    let spans: Vec<(usize, usize)> = line
        .match_indices('\t')
        .map(|(i, _)| (i, i + 1))
        .collect();
    interleave(line, SeparatorKind::Tab, &spans)
}

fn split_pipes(line: &str) -> Vec<LinePiece> {
    let bytes = line.as_bytes();
    let is_space = |b: u8| b == b' ' || b == b'\t';
    let separating: Vec<usize> = (0..bytes.len())
        .filter(|&i| {
            bytes[i] == b'|'
                && (i == 0 || is_space(bytes[i - 1]))
                && (i + 1 == bytes.len() || is_space(bytes[i + 1]))
        })
        .collect();

    let mut spans = Vec::with_capacity(separating.len());
    let mut claimed = 0;
    for (n, &pipe) in separating.iter().enumerate() {
        let mut start = pipe;
        while start > claimed && is_space(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = pipe + 1;
        while end < bytes.len() && is_space(bytes[end]) {
            end += 1;
        }
        // whitespace directly before the next separating pipe belongs to that pipe
        if let Some(&next) = separating.get(n + 1) {
            if end == next {
                end = pipe + 1;
            }
        }
        spans.push((start, end));
        claimed = end;
    }
    // rows without a closing pipe still end in a separator
    let trailing = line.trim_end_matches([' ', '\t']).len();
    if trailing > claimed && trailing < bytes.len() {
        spans.push((trailing, bytes.len()));
    }
    interleave(line, SeparatorKind::Pipe, &spans)
}

/// Merges separator/empty-cell runs at both ends of the row into single separators.
fn fold_edge_cells(pieces: Vec<LinePiece>, kind: SeparatorKind) -> Vec<LinePiece> {
    let is_blank_cell = |p: &LinePiece| matches!(p, LinePiece::Cell(c) if c.text.is_empty());
    let first_content = pieces
        .iter()
        .position(|p| matches!(p, LinePiece::Cell(c) if !c.text.is_empty()));
    let Some(first_content) = first_content else {
        return merge_all(pieces, kind);
    };
    let last_content = pieces
        .iter()
        .rposition(|p| matches!(p, LinePiece::Cell(c) if !c.text.is_empty()))
        .unwrap_or(first_content);

    let mut folded = Vec::with_capacity(pieces.len());
    let (head, rest) = pieces.split_at(first_content);
    if !head.is_empty() {
        folded.extend(merge_all(head.to_vec(), kind));
    }
    let (middle, tail) = rest.split_at(last_content - first_content + 1);
    folded.extend(middle.iter().cloned());
    if !tail.is_empty() {
        debug_assert!(tail.iter().all(|p| !matches!(p, LinePiece::Cell(_)) || is_blank_cell(p)));
        folded.extend(merge_all(tail.to_vec(), kind));
    }
    folded
}

fn merge_all(pieces: Vec<LinePiece>, kind: SeparatorKind) -> Vec<LinePiece> {
    let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
        return pieces;
    };
    if pieces.len() == 1 {
        return pieces;
    }
    let (start, end) = (first.start(), last.end());
    let text = pieces
        .iter()
        .map(|p| match p {
            LinePiece::Separator(s) => s.text.as_str(),
            LinePiece::Cell(c) => c.text.as_str(),
        })
        .collect::<String>();
    vec![LinePiece::Separator(Separator {
        kind,
        start,
        end,
        text,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(split: &SplitLine) -> Vec<String> {
        split
            .pieces
            .iter()
            .map(|p| match p {
                LinePiece::Separator(s) => format!("<{}>", s.text),
                LinePiece::Cell(c) => c.text.clone(),
            })
            .collect()
    }

    #[test]
    fn whitespace_needs_two_spaces_or_a_tab() {
        let split = split_line("Log  a b\tc \td", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["Log", "<  >", "a b", "<\t>", "c", "< \t>", "d"]);
    }

    #[test]
    fn single_spaced_line_is_one_cell() {
        let split = split_line("Log many words here", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["Log many words here"]);
        assert!(!split.is_indented());
    }

    #[test]
    fn leading_and_trailing_whitespace_are_separators() {
        let split = split_line("  Log    x ", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["<  >", "Log", "<    >", "x", "< >"]);
        assert!(split.is_indented());
    }

    #[test]
    fn whitespace_only_line_has_no_cells() {
        let split = split_line("    ", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["<    >"]);
        assert!(!split.has_cells());
        assert!(split_line("", FileFormat::Robot).pieces.is_empty());
    }

    #[test]
    fn pipe_rows_fold_leading_empty_cells() {
        let split = split_line("|    | Log | x |", FileFormat::Robot);
        assert_eq!(split.kind, SeparatorKind::Pipe);
        assert_eq!(texts(&split), vec!["<|    | >", "Log", "< | >", "x", "< |>"]);
        assert!(split.is_indented());
    }

    #[test]
    fn pipe_rows_keep_inner_empty_cells() {
        let split = split_line("| a | | b |", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["<| >", "a", "< |>", "", "< | >", "b", "< |>"]);
    }

    #[test]
    fn pipes_inside_cells_are_text() {
        let split = split_line("| Log | a|b |", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["<| >", "Log", "< | >", "a|b", "< |>"]);
        assert!(!split.is_indented());
    }

    #[test]
    fn pipe_rows_without_closing_pipe_trim_the_last_cell() {
        let split = split_line("| T | Log | a ", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["<| >", "T", "< | >", "Log", "< | >", "a", "< >"]);
        assert_eq!(texts(&split_line("|\ta ", FileFormat::Robot)), vec!["<|\t>", "a", "< >"]);
    }

    #[test]
    fn single_leading_space_does_not_indent() {
        let split = split_line(" Log", FileFormat::Robot);
        assert_eq!(texts(&split), vec!["< >", "Log"]);
        assert!(!split.is_indented());
        assert!(split_line(" \tLog", FileFormat::Robot).is_indented());
    }

    #[test]
    fn pipe_detection_needs_leading_pipe() {
        assert!(is_pipe_line("| a", FileFormat::Robot));
        assert!(is_pipe_line("|", FileFormat::Txt));
        assert!(!is_pipe_line("|a", FileFormat::Robot));
        assert!(!is_pipe_line("a | b", FileFormat::Robot));
        assert!(!is_pipe_line("| a", FileFormat::Tsv));
    }

    #[test]
    fn tsv_splits_only_on_tabs() {
        let split = split_line("Log  x\ty  z\t\tw", FileFormat::Tsv);
        assert_eq!(texts(&split), vec!["Log  x", "<\t>", "y  z", "<\t>", "", "<\t>", "w"]);
        let indented = split_line("\t\tLog", FileFormat::Tsv);
        assert_eq!(texts(&indented), vec!["<\t\t>", "Log"]);
    }

    #[test]
    fn pieces_cover_the_whole_line() {
        for line in ["| a | | b |", "  x  y ", "a\tb", "|    | Log |", "| T | Log | a "] {
            let split = split_line(line, FileFormat::Robot);
            let rebuilt: String = split
                .pieces
                .iter()
                .map(|p| match p {
                    LinePiece::Separator(s) => s.text.clone(),
                    LinePiece::Cell(c) => c.text.clone(),
                })
                .collect();
            assert_eq!(rebuilt, line);
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(FileFormat::from_path("suite.robot"), Some(FileFormat::Robot));
        assert_eq!(FileFormat::from_path("res.TXT"), Some(FileFormat::Txt));
        assert_eq!(FileFormat::from_path("data.tsv"), Some(FileFormat::Tsv));
        assert_eq!(FileFormat::from_path("notes.md"), None);
    }
}
