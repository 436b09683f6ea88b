//! Declaration rows, headers and line-level entries

use crate::robot::token::{
    LocalSettingKind, RobotTokenType, SettingKind, TokenArena, TokenId, ValueRole, VariableKind,
};

/// The header cell of a table plus the rest of its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub(crate) declaration: TokenId,
    pub(crate) columns: Vec<TokenId>,
    pub(crate) comments: Vec<TokenId>,
    pub(crate) continuations: Vec<TokenId>,
    pub(crate) unknown: Vec<TokenId>,
}

impl TableHeader {
    pub(crate) fn new(declaration: TokenId) -> Self {
        Self {
            declaration,
            columns: Vec::new(),
            comments: Vec::new(),
            continuations: Vec::new(),
            unknown: Vec::new(),
        }
    }

    pub fn declaration(&self) -> TokenId {
        self.declaration
    }

    /// Extra header cells, such as `Value` in `*** Variables ***    Value`.
    pub fn columns(&self) -> &[TokenId] {
        &self.columns
    }

    pub fn comments(&self) -> &[TokenId] {
        &self.comments
    }

    pub fn continuations(&self) -> &[TokenId] {
        &self.continuations
    }

    /// Tokens no mapper claimed while this section was open.
    pub fn unknown(&self) -> &[TokenId] {
        &self.unknown
    }

    pub fn tokens(&self) -> Vec<TokenId> {
        let mut tokens = vec![self.declaration];
        tokens.extend(&self.columns);
        tokens.extend(&self.comments);
        tokens.extend(&self.continuations);
        tokens.extend(&self.unknown);
        tokens
    }
}

/// A declaration cell followed by value cells, possibly continued over several lines.
///
/// Shared by settings-table settings, variables and bracketed local settings; `K` is the
/// declaration kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRow<K> {
    pub(crate) kind: K,
    pub(crate) declaration: TokenId,
    pub(crate) values: Vec<TokenId>,
    pub(crate) comments: Vec<TokenId>,
    pub(crate) continuations: Vec<TokenId>,
    pub(crate) unknown: Vec<TokenId>,
}

pub type Setting = DeclarationRow<SettingKind>;
pub type Variable = DeclarationRow<VariableKind>;
pub type LocalSetting = DeclarationRow<LocalSettingKind>;

impl<K: Copy> DeclarationRow<K> {
    pub(crate) fn new(kind: K, declaration: TokenId) -> Self {
        Self {
            kind,
            declaration,
            values: Vec::new(),
            comments: Vec::new(),
            continuations: Vec::new(),
            unknown: Vec::new(),
        }
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn declaration(&self) -> TokenId {
        self.declaration
    }

    pub fn values(&self) -> &[TokenId] {
        &self.values
    }

    pub fn comments(&self) -> &[TokenId] {
        &self.comments
    }

    pub fn continuations(&self) -> &[TokenId] {
        &self.continuations
    }

    pub fn unknown(&self) -> &[TokenId] {
        &self.unknown
    }

    pub fn value_texts<'a>(&self, arena: &'a TokenArena) -> Vec<&'a str> {
        self.values.iter().map(|id| arena.text(*id)).collect()
    }

    /// Every token of the row in no particular order.
    pub fn tokens(&self) -> Vec<TokenId> {
        let mut tokens = vec![self.declaration];
        tokens.extend(&self.values);
        tokens.extend(&self.comments);
        tokens.extend(&self.continuations);
        tokens.extend(&self.unknown);
        tokens
    }
}

impl Setting {
    /// Values whose role is `role`, e.g. the library name or its `WITH NAME` alias.
    pub fn values_with_role(&self, arena: &TokenArena, role: ValueRole) -> Vec<TokenId> {
        self.values
            .iter()
            .copied()
            .filter(|id| {
                matches!(arena.get(*id).token_type(), RobotTokenType::SettingValue(_, r) if r == role)
            })
            .collect()
    }

    /// First value of an import setting.
    pub fn name<'a>(&self, arena: &'a TokenArena) -> Option<&'a str> {
        self.values_with_role(arena, ValueRole::Name)
            .first()
            .map(|id| arena.text(*id))
    }
}

impl Variable {
    /// The declared name without the trailing `=`.
    pub fn name<'a>(&self, arena: &'a TokenArena) -> &'a str {
        let text = arena.text(self.declaration);
        text.strip_suffix('=').map(str::trim_end).unwrap_or(text)
    }
}

/// An empty or whitespace-only line inside a table or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyLine {
    pub(crate) token: TokenId,
}

impl EmptyLine {
    pub fn token(&self) -> TokenId {
        self.token
    }
}

/// A table-level line holding only a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub(crate) comments: Vec<TokenId>,
}

impl CommentLine {
    pub fn comments(&self) -> &[TokenId] {
        &self.comments
    }
}

/// A line kept as free text: preamble lines, comment tables and unrecognized tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeRow {
    pub(crate) tokens: Vec<TokenId>,
}

impl FreeRow {
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }
}
