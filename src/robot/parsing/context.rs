//! Mutable parser state shared by the mappers

use tracing::debug;

use super::issues::ParseIssue;
use super::state::{ParsingState, StateStack};
use crate::robot::model::{FreeRow, RobotFile, SectionId, SectionKind, TableItem};
use crate::robot::recognizing::{self, RecognizerSet};
use crate::robot::token::{ElementKind, FilePosition, RobotTokenType, TableKind, TokenId};

/// The row-level unit the current line contributes to. `...` lines continue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    Header(SectionId),
    Setting(usize),
    Variable(usize),
    ElementName(usize),
    BodySetting { entry: usize, body: usize },
    Row { entry: usize, body: usize },
    Free(usize),
}

/// One cell being mapped.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub text: &'a str,
    /// Position of the cell among the cells of its line.
    pub index: usize,
    pub indented: bool,
    pub position: FilePosition,
}

impl CellContext<'_> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_hash_comment(&self) -> bool {
        recognizing::is_hash_comment(self.text)
    }

    pub fn is_continuation(&self) -> bool {
        self.is_first() && recognizing::is_line_continuation(self.text)
    }

    /// Neither a comment nor a leading `...`.
    pub fn is_plain(&self) -> bool {
        !self.is_hash_comment() && !self.is_continuation()
    }

    pub fn opens_table(&self) -> bool {
        self.is_first() && !self.indented && recognizing::looks_like_table_header(self.text)
    }
}

pub struct ParsingContext {
    pub file: RobotFile,
    pub recognizers: RecognizerSet,
    pub stack: StateStack,
    pub section: SectionId,
    /// Entry index of the open test case, task or keyword.
    pub element: Option<usize>,
    pub unit: Unit,
    /// Where `#` cells of the current line go.
    pub comment_target: Option<CommentTarget>,
    pub issues: Vec<ParseIssue>,
}

/// Owner of the comment tokens of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Header(SectionId),
    Setting(usize),
    Variable(usize),
    BodySetting { kind: ElementKind, entry: usize, body: usize },
    Row { kind: ElementKind, entry: usize, body: usize },
    TableLine { table: TableKind, entry: usize },
}

impl ParsingContext {
    pub fn new(file: RobotFile) -> Self {
        let recognizers = RecognizerSet::for_version(file.version());
        Self {
            file,
            recognizers,
            stack: StateStack::new(ParsingState::Trash),
            section: SectionId(0),
            element: None,
            unit: Unit::None,
            comment_target: None,
            issues: Vec::new(),
        }
    }

    pub fn state(&self) -> ParsingState {
        self.stack.current()
    }

    /// Table of the open section, `None` in the preamble and unrecognized tables.
    pub fn table(&self) -> Option<TableKind> {
        match self.file.section(self.section).kind() {
            SectionKind::Table(kind) => Some(kind),
            SectionKind::Preamble | SectionKind::UserOwn => None,
        }
    }

    pub fn element_kind(&self) -> Option<ElementKind> {
        self.table().and_then(TableKind::element_kind)
    }

    pub fn set_type(&mut self, token: TokenId, token_type: RobotTokenType) {
        self.file.tokens.get_mut(token).set_primary_type(token_type);
    }

    pub fn warn(&mut self, position: FilePosition, message: impl Into<String>) {
        let issue = ParseIssue::warn(position, message);
        debug!(%issue, "parse warning");
        self.issues.push(issue);
    }

    pub fn error(&mut self, position: FilePosition, message: impl Into<String>) {
        let issue = ParseIssue::error(position, message);
        debug!(%issue, "parse error");
        self.issues.push(issue);
    }

    /// Appends a free-text cell to the free row of the current line.
    pub fn push_free(&mut self, token: TokenId) {
        let section = self.section;
        let in_comments = self.table() == Some(TableKind::Comments);
        let table = if in_comments {
            &mut self.file.comments
        } else {
            &mut self.file.trash
        };
        match self.unit {
            Unit::Free(entry) => {
                if let Some(row) = table.element_at_entry_mut(entry) {
                    row.tokens.push(token);
                }
            }
            _ => {
                let entry = table.push(section, TableItem::Element(FreeRow { tokens: vec![token] }));
                self.unit = Unit::Free(entry);
            }
        }
    }

    /// Continuation state of the current unit, if it can be continued.
    pub fn unit_state(&self) -> Option<ParsingState> {
        match self.unit {
            Unit::Header(section) => match self.file.section(section).kind() {
                SectionKind::Table(kind) => Some(ParsingState::TableHeader(Some(kind))),
                _ => Some(ParsingState::TableHeader(None)),
            },
            Unit::Setting(entry) => {
                let kind = self.file.settings.entries().get(entry)?.element()?.kind();
                Some(ParsingState::SettingDeclaration(kind))
            }
            Unit::Variable(entry) => {
                let kind = self.file.variables.entries().get(entry)?.element()?.kind();
                Some(ParsingState::VariableDeclaration(kind))
            }
            Unit::BodySetting { entry, body } => {
                let element_kind = self.element_kind()?;
                let kind = self.file.code_table(element_kind).body_setting_kind(entry, body)?;
                Some(ParsingState::LocalSetting(element_kind, kind))
            }
            Unit::Row { entry, body } => {
                let element_kind = self.element_kind()?;
                self.file
                    .code_table(element_kind)
                    .is_row(entry, body)
                    .then_some(ParsingState::ExecutableRow(element_kind))
            }
            Unit::None | Unit::ElementName(_) | Unit::Free(_) => None,
        }
    }
}
