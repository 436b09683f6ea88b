//! The root of the model

use super::code_table::CodeTable;
use super::elements::{FreeRow, Setting, Variable};
use super::line::RobotLine;
use super::row::{Task, TestCase, UserKeyword};
use super::table::{Section, SectionId, SectionKind, Table};
use crate::robot::reading::{EndOfLine, FileFormat};
use crate::robot::token::{ElementKind, RobotToken, TableKind, TokenArena, TokenId};
use crate::robot::version::RobotVersion;

/// One parsed Robot Framework data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotFile {
    pub(crate) version: RobotVersion,
    pub(crate) format: FileFormat,
    pub(crate) has_bom: bool,
    pub(crate) eol_override: Option<EndOfLine>,
    pub(crate) tokens: TokenArena,
    pub(crate) lines: Vec<RobotLine>,
    pub(crate) sections: Vec<Section>,
    pub(crate) settings: Table<Setting>,
    pub(crate) variables: Table<Variable>,
    pub(crate) test_cases: Table<TestCase>,
    pub(crate) tasks: Table<Task>,
    pub(crate) keywords: Table<UserKeyword>,
    pub(crate) comments: Table<FreeRow>,
    /// Rows of the preamble and of user-own tables.
    pub(crate) trash: Table<FreeRow>,
}

impl RobotFile {
    pub fn new(version: RobotVersion, format: FileFormat) -> Self {
        Self {
            version,
            format,
            has_bom: false,
            eol_override: None,
            tokens: TokenArena::new(),
            lines: Vec::new(),
            sections: vec![Section {
                kind: SectionKind::Preamble,
                header: None,
            }],
            settings: Table::default(),
            variables: Table::default(),
            test_cases: Table::default(),
            tasks: Table::default(),
            keywords: Table::default(),
            comments: Table::default(),
            trash: Table::default(),
        }
    }

    pub fn version(&self) -> RobotVersion {
        self.version
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    pub fn eol_override(&self) -> Option<EndOfLine> {
        self.eol_override
    }

    pub fn tokens(&self) -> &TokenArena {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> &RobotToken {
        self.tokens.get(id)
    }

    pub fn text(&self, id: TokenId) -> &str {
        self.tokens.text(id)
    }

    pub fn lines(&self) -> &[RobotLine] {
        &self.lines
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn settings(&self) -> &Table<Setting> {
        &self.settings
    }

    pub fn variables(&self) -> &Table<Variable> {
        &self.variables
    }

    pub fn test_cases(&self) -> &Table<TestCase> {
        &self.test_cases
    }

    pub fn tasks(&self) -> &Table<Task> {
        &self.tasks
    }

    pub fn keywords(&self) -> &Table<UserKeyword> {
        &self.keywords
    }

    pub fn comments(&self) -> &Table<FreeRow> {
        &self.comments
    }

    pub fn trash(&self) -> &Table<FreeRow> {
        &self.trash
    }

    /// Whether a header for `kind` was seen or generated.
    pub fn is_table_present(&self, kind: TableKind) -> bool {
        match kind {
            TableKind::Settings => self.settings.is_present(),
            TableKind::Variables => self.variables.is_present(),
            TableKind::TestCases => self.test_cases.is_present(),
            TableKind::Tasks => self.tasks.is_present(),
            TableKind::Keywords => self.keywords.is_present(),
            TableKind::Comments => self.comments.is_present(),
        }
    }

    pub(crate) fn code_table(&self, kind: ElementKind) -> &dyn CodeTable {
        match kind {
            ElementKind::TestCase => &self.test_cases,
            ElementKind::Task => &self.tasks,
            ElementKind::Keyword => &self.keywords,
        }
    }

    pub(crate) fn code_table_mut(&mut self, kind: ElementKind) -> &mut dyn CodeTable {
        match kind {
            ElementKind::TestCase => &mut self.test_cases,
            ElementKind::Task => &mut self.tasks,
            ElementKind::Keyword => &mut self.keywords,
        }
    }

    /// Split borrow for code paths that edit a table and its tokens together.
    pub(crate) fn code_table_and_tokens(&mut self, kind: ElementKind) -> (&mut dyn CodeTable, &mut TokenArena) {
        let table: &mut dyn CodeTable = match kind {
            ElementKind::TestCase => &mut self.test_cases,
            ElementKind::Task => &mut self.tasks,
            ElementKind::Keyword => &mut self.keywords,
        };
        (table, &mut self.tokens)
    }

    pub(crate) fn push_section(&mut self, section: Section) -> SectionId {
        self.sections.push(section);
        SectionId(self.sections.len() - 1)
    }

    pub(crate) fn section_mut(&mut self, id: SectionId) -> &mut Section {
        &mut self.sections[id.0]
    }

    pub(crate) fn headers_of_mut(&mut self, kind: TableKind) -> &mut Vec<SectionId> {
        match kind {
            TableKind::Settings => &mut self.settings.headers,
            TableKind::Variables => &mut self.variables.headers,
            TableKind::TestCases => &mut self.test_cases.headers,
            TableKind::Tasks => &mut self.tasks.headers,
            TableKind::Keywords => &mut self.keywords.headers,
            TableKind::Comments => &mut self.comments.headers,
        }
    }

    pub(crate) fn alloc(&mut self, token: RobotToken) -> TokenId {
        self.tokens.alloc(token)
    }
}
