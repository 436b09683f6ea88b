//! Test cases, tasks and keywords
//!
//! The three share one generic shape. The owner marker fixes which local settings the
//! element accepts and which token types its rows carry.

use std::fmt;
use std::marker::PhantomData;

use super::descriptor::RowDescriptor;
use super::elements::{EmptyLine, LocalSetting};
use crate::robot::token::{ElementKind, LocalSettingKind, TokenArena, TokenId};

pub trait RowOwner:
    fmt::Debug + Clone + Copy + PartialEq + Eq + Default + Send + Sync + 'static
{
    const KIND: ElementKind;

    /// Whether `[setting]` is allowed inside this kind of element.
    fn supports(setting: LocalSettingKind) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestCaseOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordOwner;

impl RowOwner for TestCaseOwner {
    const KIND: ElementKind = ElementKind::TestCase;

    fn supports(setting: LocalSettingKind) -> bool {
        use LocalSettingKind::*;
        matches!(setting, Documentation | Tags | Setup | Teardown | Template | Timeout)
    }
}

impl RowOwner for TaskOwner {
    const KIND: ElementKind = ElementKind::Task;

    fn supports(setting: LocalSettingKind) -> bool {
        TestCaseOwner::supports(setting)
    }
}

impl RowOwner for KeywordOwner {
    const KIND: ElementKind = ElementKind::Keyword;

    fn supports(setting: LocalSettingKind) -> bool {
        use LocalSettingKind::*;
        matches!(setting, Documentation | Tags | Teardown | Timeout | Arguments | Return)
    }
}

/// One executable line (plus its `...` continuations) of an element body.
///
/// A row with no action is a comment-only row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableRow<O: RowOwner> {
    pub(crate) action: Option<TokenId>,
    pub(crate) arguments: Vec<TokenId>,
    pub(crate) comments: Vec<TokenId>,
    pub(crate) continuations: Vec<TokenId>,
    pub(crate) descriptor: RowDescriptor,
    owner: PhantomData<O>,
}

impl<O: RowOwner> ExecutableRow<O> {
    pub(crate) fn new(action: Option<TokenId>) -> Self {
        Self {
            action,
            arguments: Vec::new(),
            comments: Vec::new(),
            continuations: Vec::new(),
            descriptor: RowDescriptor::default(),
            owner: PhantomData,
        }
    }

    pub fn action(&self) -> Option<TokenId> {
        self.action
    }

    pub fn arguments(&self) -> &[TokenId] {
        &self.arguments
    }

    pub fn comments(&self) -> &[TokenId] {
        &self.comments
    }

    pub fn continuations(&self) -> &[TokenId] {
        &self.continuations
    }

    pub fn descriptor(&self) -> &RowDescriptor {
        &self.descriptor
    }

    pub fn is_comment_only(&self) -> bool {
        self.action.is_none()
    }

    /// Action followed by arguments, the executable cells in order.
    pub fn cells(&self) -> Vec<TokenId> {
        self.action.iter().chain(&self.arguments).copied().collect()
    }

    pub fn tokens(&self) -> Vec<TokenId> {
        let mut tokens = self.cells();
        tokens.extend(&self.comments);
        tokens.extend(&self.continuations);
        tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem<O: RowOwner> {
    Setting(LocalSetting),
    Row(ExecutableRow<O>),
    Empty(EmptyLine),
}

impl<O: RowOwner> BodyItem<O> {
    pub fn tokens(&self) -> Vec<TokenId> {
        match self {
            BodyItem::Setting(setting) => setting.tokens(),
            BodyItem::Row(row) => row.tokens(),
            BodyItem::Empty(empty) => vec![empty.token],
        }
    }
}

/// A named element with an ordered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeElement<O: RowOwner> {
    pub(crate) name: TokenId,
    pub(crate) body: Vec<BodyItem<O>>,
}

pub type TestCase = CodeElement<TestCaseOwner>;
pub type Task = CodeElement<TaskOwner>;
pub type UserKeyword = CodeElement<KeywordOwner>;

impl<O: RowOwner> CodeElement<O> {
    pub(crate) fn new(name: TokenId) -> Self {
        Self {
            name,
            body: Vec::new(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        O::KIND
    }

    pub fn name(&self) -> TokenId {
        self.name
    }

    pub fn name_text<'a>(&self, arena: &'a TokenArena) -> &'a str {
        arena.text(self.name)
    }

    pub fn body(&self) -> &[BodyItem<O>] {
        &self.body
    }

    pub fn rows(&self) -> impl Iterator<Item = &ExecutableRow<O>> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Row(row) => Some(row),
            _ => None,
        })
    }

    /// Rows that execute something, comment-only rows excluded.
    pub fn executable_rows(&self) -> impl Iterator<Item = &ExecutableRow<O>> {
        self.rows().filter(|row| !row.is_comment_only())
    }

    pub fn settings(&self) -> impl Iterator<Item = &LocalSetting> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Setting(setting) => Some(setting),
            _ => None,
        })
    }

    pub fn settings_of(&self, kind: LocalSettingKind) -> impl Iterator<Item = &LocalSetting> {
        self.settings().filter(move |s| s.kind() == kind)
    }

    /// Values of every `[Arguments]` setting, in order.
    pub fn argument_tokens(&self) -> Vec<TokenId> {
        self.settings_of(LocalSettingKind::Arguments)
            .flat_map(|s| s.values().iter().copied())
            .collect()
    }

    pub fn tokens(&self) -> Vec<TokenId> {
        let mut tokens = vec![self.name];
        for item in &self.body {
            tokens.extend(item.tokens());
        }
        tokens
    }
}
