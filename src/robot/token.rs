//! Tokens
//!
//!     A [RobotToken] is one cell of the source (or one cell created through a model update).
//!     It keeps the raw text it was read from, its current text, its semantic types and its
//!     file position. Tokens live in a per-file [TokenArena]; model elements refer to them by
//!     [TokenId] and each id is owned by exactly one element.
//!
//!     The type is a closed enumeration, nested where the original syntax has families
//!     (one declaration type per setting kind, one value type per setting kind and role).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TableKind {
    Settings,
    Variables,
    TestCases,
    Tasks,
    Keywords,
    Comments,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Settings,
        TableKind::Variables,
        TableKind::TestCases,
        TableKind::Tasks,
        TableKind::Keywords,
        TableKind::Comments,
    ];

    /// Header text used when a header has to be generated.
    pub fn header_text(self) -> &'static str {
        match self {
            TableKind::Settings => "*** Settings ***",
            TableKind::Variables => "*** Variables ***",
            TableKind::TestCases => "*** Test Cases ***",
            TableKind::Tasks => "*** Tasks ***",
            TableKind::Keywords => "*** Keywords ***",
            TableKind::Comments => "*** Comments ***",
        }
    }

    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            TableKind::TestCases => Some(ElementKind::TestCase),
            TableKind::Tasks => Some(ElementKind::Task),
            TableKind::Keywords => Some(ElementKind::Keyword),
            _ => None,
        }
    }
}

/// Owner of executable rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    TestCase,
    Task,
    Keyword,
}

impl ElementKind {
    pub fn table(self) -> TableKind {
        match self {
            ElementKind::TestCase => TableKind::TestCases,
            ElementKind::Task => TableKind::Tasks,
            ElementKind::Keyword => TableKind::Keywords,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ElementKind::TestCase => "test case",
            ElementKind::Task => "task",
            ElementKind::Keyword => "keyword",
        }
    }
}

/// Settings table declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SettingKind {
    Library,
    Resource,
    Variables,
    Documentation,
    Metadata,
    SuiteSetup,
    SuiteTeardown,
    TestSetup,
    TestTeardown,
    TestTemplate,
    TestTimeout,
    TaskSetup,
    TaskTeardown,
    TaskTemplate,
    TaskTimeout,
    ForceTags,
    DefaultTags,
    Unknown,
}

impl SettingKind {
    /// Canonical spelling used for generated declarations.
    pub fn representation(self) -> &'static str {
        match self {
            SettingKind::Library => "Library",
            SettingKind::Resource => "Resource",
            SettingKind::Variables => "Variables",
            SettingKind::Documentation => "Documentation",
            SettingKind::Metadata => "Metadata",
            SettingKind::SuiteSetup => "Suite Setup",
            SettingKind::SuiteTeardown => "Suite Teardown",
            SettingKind::TestSetup => "Test Setup",
            SettingKind::TestTeardown => "Test Teardown",
            SettingKind::TestTemplate => "Test Template",
            SettingKind::TestTimeout => "Test Timeout",
            SettingKind::TaskSetup => "Task Setup",
            SettingKind::TaskTeardown => "Task Teardown",
            SettingKind::TaskTemplate => "Task Template",
            SettingKind::TaskTimeout => "Task Timeout",
            SettingKind::ForceTags => "Force Tags",
            SettingKind::DefaultTags => "Default Tags",
            SettingKind::Unknown => "",
        }
    }

    /// Settings that are meaningless without a first value.
    pub fn requires_name(self) -> bool {
        matches!(
            self,
            SettingKind::Library | SettingKind::Resource | SettingKind::Variables
        )
    }

    /// Role of the value at `index`, given the roles already assigned on this row.
    pub fn value_role(self, index: usize, previous: &[ValueRole], text: &str) -> ValueRole {
        match self {
            SettingKind::Library => match previous.last() {
                _ if index == 0 => ValueRole::Name,
                Some(ValueRole::Alias) => ValueRole::AliasValue,
                Some(ValueRole::AliasValue | ValueRole::Unwanted) => ValueRole::Unwanted,
                _ if text == "WITH NAME" => ValueRole::Alias,
                _ => ValueRole::Argument,
            },
            SettingKind::Resource => positional(index, ValueRole::Name, ValueRole::Unwanted),
            SettingKind::Variables => positional(index, ValueRole::Name, ValueRole::Argument),
            SettingKind::Documentation => ValueRole::Text,
            SettingKind::Metadata => positional(index, ValueRole::Key, ValueRole::Value),
            SettingKind::SuiteSetup
            | SettingKind::SuiteTeardown
            | SettingKind::TestSetup
            | SettingKind::TestTeardown
            | SettingKind::TaskSetup
            | SettingKind::TaskTeardown => positional(index, ValueRole::Name, ValueRole::Argument),
            SettingKind::TestTemplate | SettingKind::TaskTemplate => {
                positional(index, ValueRole::Name, ValueRole::Unwanted)
            }
            SettingKind::TestTimeout | SettingKind::TaskTimeout => {
                positional(index, ValueRole::Value, ValueRole::Text)
            }
            SettingKind::ForceTags | SettingKind::DefaultTags => ValueRole::Tag,
            SettingKind::Unknown => ValueRole::Argument,
        }
    }
}

/// Bracketed settings inside test cases, tasks and keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LocalSettingKind {
    Documentation,
    Tags,
    Setup,
    Teardown,
    Template,
    Timeout,
    Arguments,
    Return,
    Unknown,
}

impl LocalSettingKind {
    pub fn representation(self) -> &'static str {
        match self {
            LocalSettingKind::Documentation => "[Documentation]",
            LocalSettingKind::Tags => "[Tags]",
            LocalSettingKind::Setup => "[Setup]",
            LocalSettingKind::Teardown => "[Teardown]",
            LocalSettingKind::Template => "[Template]",
            LocalSettingKind::Timeout => "[Timeout]",
            LocalSettingKind::Arguments => "[Arguments]",
            LocalSettingKind::Return => "[Return]",
            LocalSettingKind::Unknown => "[]",
        }
    }

    pub fn value_role(self, index: usize) -> ValueRole {
        match self {
            LocalSettingKind::Documentation => ValueRole::Text,
            LocalSettingKind::Tags => ValueRole::Tag,
            LocalSettingKind::Setup | LocalSettingKind::Teardown => {
                positional(index, ValueRole::Name, ValueRole::Argument)
            }
            LocalSettingKind::Template => positional(index, ValueRole::Name, ValueRole::Unwanted),
            LocalSettingKind::Timeout => positional(index, ValueRole::Value, ValueRole::Text),
            LocalSettingKind::Arguments | LocalSettingKind::Unknown => ValueRole::Argument,
            LocalSettingKind::Return => ValueRole::Value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariableKind {
    Scalar,
    /// Scalar declared with several values, the pre-2.9 way of declaring a list.
    ScalarAsList,
    List,
    Dictionary,
    Unknown,
}

/// Position-dependent meaning of a value cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueRole {
    Name,
    Argument,
    /// `WITH NAME`
    Alias,
    AliasValue,
    Text,
    Key,
    Value,
    Tag,
    Unwanted,
}

fn positional(index: usize, first: ValueRole, rest: ValueRole) -> ValueRole {
    if index == 0 {
        first
    } else {
        rest
    }
}

/// Semantic type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RobotTokenType {
    Unknown,
    TableHeader(TableKind),
    UserOwnTableHeader,
    TableHeaderColumn,
    SettingDeclaration(SettingKind),
    SettingValue(SettingKind, ValueRole),
    VariableDeclaration(VariableKind),
    VariableValue,
    ElementName(ElementKind),
    LocalSettingDeclaration(LocalSettingKind),
    LocalSettingValue(LocalSettingKind, ValueRole),
    ActionName(ElementKind),
    ActionArgument(ElementKind),
    /// `: FOR`, `:FOR` or `FOR`
    ForDeclaration,
    /// `IN`, `IN RANGE`, `IN ENUMERATE`, `IN ZIP`
    ForIn,
    ForEnd,
    /// `\` opening an old-style loop body row
    ForContinue,
    /// `${x}=` before the keyword of a row
    Assignment,
    VariableUsage,
    StartHashComment,
    CommentContinue,
    /// `...`
    PreviousLineContinue,
    /// Content of an empty or whitespace-only line
    PrettyAlignSpace,
    /// Cells of the preamble, comment tables and unrecognized tables
    FreeText,
}

/// Coarse grouping used by dump sorters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Declaration,
    Value,
    Action,
    Argument,
    Comment,
    Continuation,
    Filler,
    Unknown,
}

impl RobotTokenType {
    pub fn class(self) -> TokenClass {
        use RobotTokenType::*;
        match self {
            TableHeader(_) | UserOwnTableHeader | SettingDeclaration(_)
            | VariableDeclaration(_) | ElementName(_) | LocalSettingDeclaration(_) => {
                TokenClass::Declaration
            }
            TableHeaderColumn | SettingValue(..) | VariableValue | LocalSettingValue(..) => {
                TokenClass::Value
            }
            ActionName(_) | ForDeclaration | ForEnd | ForContinue => TokenClass::Action,
            ActionArgument(_) | ForIn | Assignment | VariableUsage => TokenClass::Argument,
            StartHashComment | CommentContinue => TokenClass::Comment,
            PreviousLineContinue => TokenClass::Continuation,
            PrettyAlignSpace | FreeText => TokenClass::Filler,
            Unknown => TokenClass::Unknown,
        }
    }

    pub fn is_comment(self) -> bool {
        self.class() == TokenClass::Comment
    }
}

/// Position of a token in the original file. `line` is 1-based, `column` 0-based, both in
/// bytes; `offset` is the absolute byte offset including any BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FilePosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl FilePosition {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Start of a standalone text, for extraction outside any file.
    pub fn start() -> Self {
        Self::new(1, 0, 0)
    }

    /// Position `delta` bytes further on the same line.
    pub fn advanced(&self, delta: usize) -> Self {
        Self::new(self.line, self.column + delta, self.offset + delta)
    }
}

/// Handle into a [TokenArena].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TokenId(pub(crate) usize);

impl TokenId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotToken {
    text: String,
    raw: String,
    types: Vec<RobotTokenType>,
    position: Option<FilePosition>,
    dirty: bool,
    removed: bool,
}

impl RobotToken {
    /// Token read from the file: raw and current text start equal.
    pub fn parsed(text: impl Into<String>, position: FilePosition) -> Self {
        let text = text.into();
        Self {
            raw: text.clone(),
            text,
            types: vec![RobotTokenType::Unknown],
            position: Some(position),
            dirty: false,
            removed: false,
        }
    }

    /// Token created through a model update. It has no raw form and no position.
    pub fn created(text: impl Into<String>, token_type: RobotTokenType) -> Self {
        Self {
            text: text.into(),
            raw: String::new(),
            types: vec![token_type],
            position: None,
            dirty: true,
            removed: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Primary type.
    pub fn token_type(&self) -> RobotTokenType {
        self.types[0]
    }

    pub fn types(&self) -> &[RobotTokenType] {
        &self.types
    }

    pub fn has_type(&self, token_type: RobotTokenType) -> bool {
        self.types.contains(&token_type)
    }

    pub fn position(&self) -> Option<FilePosition> {
        self.position
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn set_primary_type(&mut self, token_type: RobotTokenType) {
        self.types[0] = token_type;
    }

    pub(crate) fn add_type(&mut self, token_type: RobotTokenType) {
        if !self.types.contains(&token_type) {
            self.types.push(token_type);
        }
    }

    /// In-place text edit. The raw form goes stale and the dumper re-materializes the text.
    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.dirty = self.dirty || text != self.raw;
        self.text = text;
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
    }
}

/// Flat per-file token storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenArena {
    tokens: Vec<RobotToken>,
}

impl TokenArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, token: RobotToken) -> TokenId {
        self.tokens.push(token);
        TokenId(self.tokens.len() - 1)
    }

    pub fn get(&self, id: TokenId) -> &RobotToken {
        &self.tokens[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: TokenId) -> &mut RobotToken {
        &mut self.tokens[id.0]
    }

    pub fn text(&self, id: TokenId) -> &str {
        self.get(id).text()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &RobotToken)> {
        self.tokens.iter().enumerate().map(|(i, t)| (TokenId(i), t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_roles_follow_with_name() {
        let mut roles = Vec::new();
        for (i, text) in ["Collections", "arg", "WITH NAME", "C", "extra"].iter().enumerate() {
            let role = SettingKind::Library.value_role(i, &roles, text);
            roles.push(role);
        }
        assert_eq!(
            roles,
            vec![
                ValueRole::Name,
                ValueRole::Argument,
                ValueRole::Alias,
                ValueRole::AliasValue,
                ValueRole::Unwanted
            ]
        );
    }

    #[test]
    fn editing_marks_token_dirty_only_when_text_changes() {
        let mut token = RobotToken::parsed("Log", FilePosition::new(2, 4, 20));
        token.set_text("Log");
        assert!(!token.is_dirty());
        token.set_text("Log Many");
        assert!(token.is_dirty());
        assert_eq!(token.raw(), "Log");
    }

    #[test]
    fn created_tokens_have_no_position() {
        let token = RobotToken::created("x", RobotTokenType::VariableValue);
        assert!(token.position().is_none());
        assert!(token.is_dirty());
        assert_eq!(token.token_type().class(), TokenClass::Value);
    }
}
