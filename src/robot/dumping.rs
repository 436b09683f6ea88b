//! Dumping
//!
//!     Writes a [RobotFile] back to text. The model is walked in file order (sections, then the
//!     entries of each section, then element bodies) and cut into units: a table header, a
//!     setting, a variable, an element name, a local setting, a row, an empty line, a comment
//!     line or a free row. Each unit owns a [sorter] that fixes the order of its tokens.
//!
//!     Units made of tokens read from the file are written by re-emitting their original lines:
//!
//!         - a line is written whole, separators included, the first time any unit reaches it;
//!           later units sharing the line skip it
//!         - lines between two lines of the same unit (comments and empty lines inside a
//!           continued row) are written in between
//!         - removed tokens are dropped together with one adjacent separator, and lines left
//!           without tokens are dropped
//!         - dirty tokens are [materialized](materialize) from their current text
//!
//!     Tokens created by updates go to the last line of their unit, before its comments.
//!     Units made only of created tokens become fresh lines, laid out by the sorter with the
//!     configured separators. Without edits the output equals the input byte for byte.

pub mod materialize;
pub mod sorter;
pub mod writer;

use std::collections::HashMap;

use tracing::{debug, warn};

use self::materialize::{materialize, CellStyle};
use self::sorter::Sorter;
use self::writer::LineWriter;
use crate::robot::config::RobotDataConfig;
use crate::robot::model::{
    BodyItem, CodeElement, DeclarationRow, FreeRow, LineElement, RobotFile, RobotLine, RowOwner, SectionId,
    SectionKind, Table, TableItem,
};
use crate::robot::reading::{EndOfLine, SeparatorKind};
use crate::robot::token::{TableKind, TokenClass, TokenId};

/// Separators and terminators for text the dumper has to invent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Between cells of fresh whitespace-separated lines, and as their indentation.
    pub separator: String,
    pub pipe_separator: String,
    pub tsv_separator: String,
    /// Forces every terminator. Takes precedence over the override stored in the model.
    pub eol: Option<EndOfLine>,
    /// Written for cells whose value is empty.
    pub empty_cell: String,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            separator: "    ".to_string(),
            pipe_separator: " | ".to_string(),
            tsv_separator: "\t".to_string(),
            eol: None,
            empty_cell: "${EMPTY}".to_string(),
        }
    }
}

impl DumpOptions {
    pub fn from_config(config: &RobotDataConfig) -> Self {
        let dumper = &config.dumper;
        Self {
            separator: dumper.separator.clone(),
            pipe_separator: dumper.pipe_separator.clone(),
            tsv_separator: dumper.tsv_separator.clone(),
            eol: EndOfLine::from_name(&dumper.eol),
            empty_cell: dumper.empty_cell.clone(),
        }
    }
}

/// Dumps with the default options.
pub fn dump(file: &RobotFile) -> String {
    dump_with(file, &DumpOptions::default())
}

pub fn dump_with(file: &RobotFile, options: &DumpOptions) -> String {
    let units = collect_units(file);
    let mut dumper = Dumper::new(file, options, &units);
    for unit in &units {
        dumper.write_unit(unit);
    }
    dumper.finish()
}

/// Tokens that are dumped together.
#[derive(Debug)]
struct DumpUnit {
    sorter: &'static Sorter,
    indented: bool,
    tokens: Vec<TokenId>,
}

fn collect_units(file: &RobotFile) -> Vec<DumpUnit> {
    let mut units = Vec::new();
    for (index, section) in file.sections().iter().enumerate() {
        let id = SectionId(index);
        if let Some(header) = section.header() {
            push_unit(&mut units, file, &sorter::HEADER, false, header.tokens());
        }
        match section.kind() {
            SectionKind::Preamble | SectionKind::UserOwn => {}
            SectionKind::Table(TableKind::Settings) => declaration_units(&mut units, file, file.settings(), id),
            SectionKind::Table(TableKind::Variables) => declaration_units(&mut units, file, file.variables(), id),
            SectionKind::Table(TableKind::TestCases) => code_units(&mut units, file, file.test_cases(), id),
            SectionKind::Table(TableKind::Tasks) => code_units(&mut units, file, file.tasks(), id),
            SectionKind::Table(TableKind::Keywords) => code_units(&mut units, file, file.keywords(), id),
            SectionKind::Table(TableKind::Comments) => free_units(&mut units, file, file.comments(), id),
        }
        free_units(&mut units, file, file.trash(), id);
    }
    units
}

fn push_unit(units: &mut Vec<DumpUnit>, file: &RobotFile, sorter: &'static Sorter, indented: bool, mut tokens: Vec<TokenId>) {
    tokens.retain(|id| !file.token(*id).is_removed());
    if tokens.is_empty() {
        return;
    }
    sorter.sort(&mut tokens, file.tokens());
    units.push(DumpUnit {
        sorter,
        indented,
        tokens,
    });
}

fn entries_of<T>(table: &Table<T>, section: SectionId) -> impl Iterator<Item = &TableItem<T>> {
    table
        .entries()
        .iter()
        .filter(move |entry| entry.section() == section)
        .map(|entry| entry.item())
}

/// Empty and comment-only lines of a table.
fn line_item_unit<T>(units: &mut Vec<DumpUnit>, file: &RobotFile, item: &TableItem<T>) {
    match item {
        TableItem::Empty(line) => push_unit(units, file, &sorter::LINE, false, vec![line.token()]),
        TableItem::Comment(line) => push_unit(units, file, &sorter::LINE, false, line.comments().to_vec()),
        TableItem::Element(_) => {}
    }
}

fn declaration_units<K: Copy>(units: &mut Vec<DumpUnit>, file: &RobotFile, table: &Table<DeclarationRow<K>>, section: SectionId) {
    for item in entries_of(table, section) {
        if let TableItem::Element(row) = item {
            push_unit(units, file, &sorter::DECLARATION, false, row.tokens());
        } else {
            line_item_unit(units, file, item);
        }
    }
}

fn code_units<O: RowOwner>(units: &mut Vec<DumpUnit>, file: &RobotFile, table: &Table<CodeElement<O>>, section: SectionId) {
    for item in entries_of(table, section) {
        let TableItem::Element(element) = item else {
            line_item_unit(units, file, item);
            continue;
        };
        push_unit(units, file, &sorter::NAME, false, vec![element.name()]);
        for body in element.body() {
            match body {
                BodyItem::Setting(setting) => push_unit(units, file, &sorter::DECLARATION, true, setting.tokens()),
                BodyItem::Row(row) => push_unit(units, file, &sorter::ROW, true, row.tokens()),
                BodyItem::Empty(line) => push_unit(units, file, &sorter::LINE, true, vec![line.token()]),
            }
        }
    }
}

fn free_units(units: &mut Vec<DumpUnit>, file: &RobotFile, table: &Table<FreeRow>, section: SectionId) {
    for item in entries_of(table, section) {
        if let TableItem::Element(row) = item {
            push_unit(units, file, &sorter::LINE, false, row.tokens().to_vec());
        } else {
            line_item_unit(units, file, item);
        }
    }
}

/// Created tokens placed on an original line, before `anchor` or at the end of the line.
#[derive(Debug)]
struct Insertion {
    anchor: Option<TokenId>,
    tokens: Vec<TokenId>,
}

struct Dumper<'a> {
    file: &'a RobotFile,
    options: &'a DumpOptions,
    writer: LineWriter,
    /// Line index of every token read from the file.
    token_lines: Vec<Option<usize>>,
    emitted: Vec<bool>,
    insertions: HashMap<usize, Vec<Insertion>>,
    fresh_style: CellStyle,
}

impl<'a> Dumper<'a> {
    fn new(file: &'a RobotFile, options: &'a DumpOptions, units: &[DumpUnit]) -> Self {
        let mut token_lines = vec![None; file.tokens().len()];
        for (index, line) in file.lines().iter().enumerate() {
            for id in line.tokens() {
                token_lines[id.index()] = Some(index);
            }
        }
        let default_eol = file
            .lines()
            .iter()
            .map(RobotLine::eol)
            .find(|eol| !eol.is_none())
            .unwrap_or(EndOfLine::Lf);
        let mut writer = LineWriter::new(default_eol, options.eol.or(file.eol_override()));
        if file.has_bom() {
            writer.write_bom();
        }
        let fresh_style = if file.format().is_tsv() {
            CellStyle::Tsv
        } else if file.lines().iter().any(|line| line_style(file, line) == CellStyle::Pipe) {
            CellStyle::Pipe
        } else {
            CellStyle::Whitespace
        };
        let mut dumper = Self {
            file,
            options,
            writer,
            emitted: vec![false; file.lines().len()],
            token_lines,
            insertions: HashMap::new(),
            fresh_style,
        };
        dumper.plan_insertions(units);
        dumper
    }

    fn line_of(&self, id: TokenId) -> Option<usize> {
        self.token_lines.get(id.index()).copied().flatten()
    }

    fn plan_insertions(&mut self, units: &[DumpUnit]) {
        for unit in units {
            let created: Vec<TokenId> = unit.tokens.iter().copied().filter(|id| self.line_of(*id).is_none()).collect();
            let Some(last) = unit.tokens.iter().filter_map(|id| self.line_of(*id)).max() else {
                continue;
            };
            if created.is_empty() {
                continue;
            }
            let anchor = unit.tokens.iter().copied().find(|id| {
                self.line_of(*id) == Some(last) && self.file.token(*id).token_type().class() == TokenClass::Comment
            });
            self.insertions.entry(last).or_default().push(Insertion { anchor, tokens: created });
        }
    }

    fn write_unit(&mut self, unit: &DumpUnit) {
        let mut lines: Vec<usize> = unit.tokens.iter().filter_map(|id| self.line_of(*id)).collect();
        if lines.is_empty() {
            self.write_fresh_line(unit);
            return;
        }
        lines.sort_unstable();
        lines.dedup();
        let mut previous: Option<usize> = None;
        for line in lines {
            if let Some(previous) = previous {
                for gap in previous + 1..line {
                    self.emit_line(gap);
                }
            }
            self.emit_line(line);
            previous = Some(line);
        }
    }

    /// Writes an original line unless it was written already or lost all its tokens.
    fn emit_line(&mut self, index: usize) {
        if self.emitted[index] {
            return;
        }
        self.emitted[index] = true;
        let file = self.file;
        let line = &file.lines()[index];
        if line.tokens().all(|id| file.token(id).is_removed()) {
            return;
        }
        let style = line_style(file, line);
        let separator = self.separator(style).to_string();
        let mut insertions = self.insertions.remove(&index).unwrap_or_default();

        self.writer.begin_line();
        let mut pending = String::new();
        let mut wrote_token = false;
        let mut drop_next_separator = false;
        for element in line.elements() {
            match element {
                LineElement::Separator(s) => {
                    if drop_next_separator {
                        drop_next_separator = false;
                    } else {
                        pending.push_str(&s.text);
                    }
                }
                LineElement::Token(id) if file.token(*id).is_removed() => {
                    if wrote_token {
                        pending.clear();
                    } else {
                        drop_next_separator = true;
                    }
                }
                LineElement::Token(id) => {
                    self.writer.push_str(&pending);
                    pending.clear();
                    if let Some(at) = insertions.iter().position(|i| i.anchor == Some(*id)) {
                        for created in insertions.remove(at).tokens {
                            let text = self.cell_text(created, style);
                            self.writer.push_str(&text);
                            self.writer.push_str(&separator);
                        }
                    }
                    let text = self.cell_text(*id, style);
                    self.writer.push_str(&text);
                    wrote_token = true;
                }
            }
        }
        for created in insertions.into_iter().flat_map(|i| i.tokens) {
            let text = self.cell_text(created, style);
            self.writer.push_str(&separator);
            self.writer.push_str(&text);
        }
        self.writer.push_str(&pending);
        self.writer.end_line(line.eol());
    }

    fn write_fresh_line(&mut self, unit: &DumpUnit) {
        let style = self.fresh_style;
        let separator = self.separator(style).to_string();
        let mut text = match (style, unit.indented) {
            (CellStyle::Pipe, true) => "|    | ".to_string(),
            (CellStyle::Pipe, false) => "| ".to_string(),
            (_, true) => separator.clone(),
            (_, false) => String::new(),
        };
        let cells: Vec<String> = unit.tokens.iter().map(|id| self.cell_text(*id, style)).collect();
        text.push_str(&cells.join(&separator));
        debug!(sorter = unit.sorter.name, cells = cells.len(), "fresh line");
        self.writer.begin_line();
        self.writer.push_str(&text);
        let eol = self.writer.fresh_eol();
        self.writer.end_line(eol);
    }

    fn cell_text(&self, id: TokenId, style: CellStyle) -> String {
        let token = self.file.token(id);
        if token.is_dirty() {
            materialize(token.text(), style, &self.options.empty_cell).into_owned()
        } else {
            token.text().to_string()
        }
    }

    fn separator(&self, style: CellStyle) -> &str {
        match style {
            CellStyle::Whitespace => &self.options.separator,
            CellStyle::Pipe => &self.options.pipe_separator,
            CellStyle::Tsv => &self.options.tsv_separator,
        }
    }

    fn finish(mut self) -> String {
        let leftover: Vec<usize> = (0..self.emitted.len()).filter(|i| !self.emitted[*i]).collect();
        if !leftover.is_empty() {
            warn!(lines = leftover.len(), "lines not reached by the model walk, appending them");
        }
        for index in leftover {
            self.emit_line(index);
        }
        debug!(lines = self.writer.lines(), "file dumped");
        self.writer.finish()
    }
}

fn line_style(file: &RobotFile, line: &RobotLine) -> CellStyle {
    if file.format().is_tsv() {
        return CellStyle::Tsv;
    }
    let first = line.elements().iter().find_map(|e| match e {
        LineElement::Separator(s) => Some(s.kind),
        LineElement::Token(_) => None,
    });
    match first {
        Some(SeparatorKind::Pipe) => CellStyle::Pipe,
        _ => CellStyle::Whitespace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::parsing::{parse_str, ParseOptions};
    use crate::robot::reading::FileFormat;
    use crate::robot::token::{ElementKind, LocalSettingKind};
    use crate::robot::version::RobotVersion;

    fn parse(text: &str) -> RobotFile {
        parse_str(text, &ParseOptions::default()).file
    }

    #[test]
    fn keyword_scenario_round_trips() {
        let text = "*** Keywords ***\nkw\n  [Arguments]    ${a}    ${b}\n  Log Many    ${a}    ${b}";
        assert_eq!(dump(&parse(text)), text);
    }

    #[test]
    fn continuation_across_comment_keeps_line_order() {
        let text = "*** Test Cases ***\nT\n    Log Many    a\n    # between\n    ...    b\n";
        assert_eq!(dump(&parse(text)), text);
    }

    #[test]
    fn appended_row_follows_unterminated_last_line() {
        let mut file = parse("*** Keywords ***\nkw\n    No Operation");
        file.add_row(ElementKind::Keyword, 0, &["Log", "done"]).unwrap();
        assert_eq!(dump(&file), "*** Keywords ***\nkw\n    No Operation\n    Log    done\n");
    }

    #[test]
    fn created_argument_goes_before_trailing_comment() {
        let mut file = parse("*** Test Cases ***\nT\n    Log    a    # note\n");
        file.add_argument(ElementKind::TestCase, 0, 0, "b").unwrap();
        assert_eq!(dump(&file), "*** Test Cases ***\nT\n    Log    a    b    # note\n");
    }

    #[test]
    fn removed_row_drops_its_line() {
        let mut file = parse("*** Test Cases ***\nT\n    Log    a\n    Log    b\n");
        file.remove_body_item(ElementKind::TestCase, 0, 0).unwrap();
        assert_eq!(dump(&file), "*** Test Cases ***\nT\n    Log    b\n");
    }

    #[test]
    fn edited_tokens_are_escaped() {
        let mut file = parse("*** Test Cases ***\nT\n    Log    a\n");
        let argument = file.test_cases().element(0).unwrap().rows().next().unwrap().arguments()[0];
        file.set_token_text(argument, "two  spaces");
        assert_eq!(dump(&file), "*** Test Cases ***\nT\n    Log    two \\ spaces\n");
    }

    #[test]
    fn pipe_files_get_pipe_fresh_lines() {
        let mut file = parse("| *** Keywords *** |\n| kw |\n|    | No Operation |\n");
        file.add_local_setting(ElementKind::Keyword, 0, LocalSettingKind::Tags, &["smoke"])
            .unwrap();
        assert_eq!(
            dump(&file),
            "| *** Keywords *** |\n| kw |\n|    | No Operation |\n|    | [Tags] | smoke\n"
        );
    }

    #[test]
    fn new_table_goes_to_the_end_of_a_tsv_file() {
        let options = ParseOptions::new(RobotVersion::LATEST, FileFormat::Tsv);
        let mut file = parse_str("*Settings*\nLibrary\tCollections\r\n", &options).file;
        file.add_variable("${x}", &["1"]).unwrap();
        assert_eq!(
            dump(&file),
            "*Settings*\nLibrary\tCollections\r\n*** Variables ***\n${x}\t1\n"
        );
    }

    #[test]
    fn eol_override_and_bom() {
        let file = parse("\u{feff}*** Settings ***\r\nLibrary    OperatingSystem\r\n");
        assert_eq!(dump(&file), "\u{feff}*** Settings ***\r\nLibrary    OperatingSystem\r\n");
        let options = DumpOptions {
            eol: Some(EndOfLine::Lf),
            ..DumpOptions::default()
        };
        assert_eq!(dump_with(&file, &options), "\u{feff}*** Settings ***\nLibrary    OperatingSystem\n");
    }
}
