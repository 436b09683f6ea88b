//! Owner-erased access to code tables
//!
//! The parser and the update operations work on test cases, tasks and keywords alike. They
//! reach the right `Table<CodeElement<O>>` through this object-safe trait, addressing
//! elements by entry position and body items by body position.

use super::descriptor::{describe_element, DescriptorIssue};
use super::elements::{CommentLine, EmptyLine, LocalSetting};
use super::row::{BodyItem, CodeElement, ExecutableRow, RowOwner};
use super::table::{SectionId, Table, TableItem};
use crate::robot::recognizing::RecognizerSet;
use crate::robot::token::{ElementKind, LocalSettingKind, TokenArena, TokenId};

/// Mutable view of a row's token lists.
pub struct RowParts<'a> {
    pub action: &'a mut Option<TokenId>,
    pub arguments: &'a mut Vec<TokenId>,
    pub comments: &'a mut Vec<TokenId>,
    pub continuations: &'a mut Vec<TokenId>,
}

impl RowParts<'_> {
    pub fn push_cell(&mut self, token: TokenId) {
        if self.action.is_none() {
            *self.action = Some(token);
        } else {
            self.arguments.push(token);
        }
    }
}

pub trait CodeTable {
    fn element_kind(&self) -> ElementKind;
    fn supports(&self, setting: LocalSettingKind) -> bool;
    fn headers_mut(&mut self) -> &mut Vec<SectionId>;
    fn last_section(&self) -> Option<SectionId>;
    fn entry_count(&self) -> usize;
    fn element_count(&self) -> usize;
    fn entry_of_element(&self, index: usize) -> Option<usize>;

    fn push_element(&mut self, section: SectionId, name: TokenId) -> usize;
    fn push_empty(&mut self, section: SectionId, line: EmptyLine) -> usize;
    fn push_comment(&mut self, section: SectionId, line: CommentLine) -> usize;
    fn comment_line_mut(&mut self, entry: usize) -> Option<&mut CommentLine>;

    fn body_len(&self, entry: usize) -> Option<usize>;
    fn push_body_setting(&mut self, entry: usize, setting: LocalSetting) -> Option<usize>;
    fn insert_body_row(&mut self, entry: usize, at: usize, action: Option<TokenId>) -> Option<usize>;
    fn push_body_empty(&mut self, entry: usize, line: EmptyLine) -> Option<usize>;
    fn body_setting_mut(&mut self, entry: usize, body: usize) -> Option<&mut LocalSetting>;
    fn row_parts_mut(&mut self, entry: usize, body: usize) -> Option<RowParts<'_>>;
    fn is_row(&self, entry: usize, body: usize) -> bool;
    fn body_setting_kind(&self, entry: usize, body: usize) -> Option<LocalSettingKind>;

    fn push_body_row(&mut self, entry: usize, action: Option<TokenId>) -> Option<usize> {
        let at = self.body_len(entry)?;
        self.insert_body_row(entry, at, action)
    }

    /// Every token of the element at `entry`.
    fn element_tokens(&self, entry: usize) -> Vec<TokenId>;
    fn remove_entry(&mut self, entry: usize) -> Vec<TokenId>;
    fn remove_body_item(&mut self, entry: usize, body: usize) -> Option<Vec<TokenId>>;
    /// Swaps the items of two entries, leaving each entry in its section.
    fn swap_items(&mut self, a: usize, b: usize);

    fn describe_entry(&mut self, entry: usize, arena: &mut TokenArena, recognizers: &RecognizerSet) -> Vec<DescriptorIssue>;

    fn describe_all(&mut self, arena: &mut TokenArena, recognizers: &RecognizerSet) -> Vec<DescriptorIssue> {
        let mut issues = Vec::new();
        for entry in 0..self.entry_count() {
            issues.extend(self.describe_entry(entry, arena, recognizers));
        }
        issues
    }
}

impl<O: RowOwner> Table<CodeElement<O>> {
    fn element_at(&self, entry: usize) -> Option<&CodeElement<O>> {
        self.entries.get(entry).and_then(|e| e.element())
    }
}

impl<O: RowOwner> CodeTable for Table<CodeElement<O>> {
    fn element_kind(&self) -> ElementKind {
        O::KIND
    }

    fn supports(&self, setting: LocalSettingKind) -> bool {
        O::supports(setting)
    }

    fn headers_mut(&mut self) -> &mut Vec<SectionId> {
        &mut self.headers
    }

    fn last_section(&self) -> Option<SectionId> {
        Table::last_section(self)
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn entry_of_element(&self, index: usize) -> Option<usize> {
        Table::entry_of_element(self, index)
    }

    fn push_element(&mut self, section: SectionId, name: TokenId) -> usize {
        self.push(section, TableItem::Element(CodeElement::new(name)))
    }

    fn push_empty(&mut self, section: SectionId, line: EmptyLine) -> usize {
        self.push(section, TableItem::Empty(line))
    }

    fn push_comment(&mut self, section: SectionId, line: CommentLine) -> usize {
        self.push(section, TableItem::Comment(line))
    }

    fn comment_line_mut(&mut self, entry: usize) -> Option<&mut CommentLine> {
        self.comment_at_mut(entry)
    }

    fn body_len(&self, entry: usize) -> Option<usize> {
        self.element_at(entry).map(|e| e.body.len())
    }

    fn push_body_setting(&mut self, entry: usize, setting: LocalSetting) -> Option<usize> {
        let element = self.element_at_entry_mut(entry)?;
        element.body.push(BodyItem::Setting(setting));
        Some(element.body.len() - 1)
    }

    fn insert_body_row(&mut self, entry: usize, at: usize, action: Option<TokenId>) -> Option<usize> {
        let element = self.element_at_entry_mut(entry)?;
        let at = at.min(element.body.len());
        element.body.insert(at, BodyItem::Row(ExecutableRow::new(action)));
        Some(at)
    }

    fn push_body_empty(&mut self, entry: usize, line: EmptyLine) -> Option<usize> {
        let element = self.element_at_entry_mut(entry)?;
        element.body.push(BodyItem::Empty(line));
        Some(element.body.len() - 1)
    }

    fn body_setting_mut(&mut self, entry: usize, body: usize) -> Option<&mut LocalSetting> {
        match self.element_at_entry_mut(entry)?.body.get_mut(body)? {
            BodyItem::Setting(setting) => Some(setting),
            _ => None,
        }
    }

    fn row_parts_mut(&mut self, entry: usize, body: usize) -> Option<RowParts<'_>> {
        match self.element_at_entry_mut(entry)?.body.get_mut(body)? {
            BodyItem::Row(row) => Some(RowParts {
                action: &mut row.action,
                arguments: &mut row.arguments,
                comments: &mut row.comments,
                continuations: &mut row.continuations,
            }),
            _ => None,
        }
    }

    fn is_row(&self, entry: usize, body: usize) -> bool {
        matches!(
            self.element_at(entry).and_then(|e| e.body.get(body)),
            Some(BodyItem::Row(_))
        )
    }

    fn body_setting_kind(&self, entry: usize, body: usize) -> Option<LocalSettingKind> {
        match self.element_at(entry)?.body.get(body)? {
            BodyItem::Setting(setting) => Some(setting.kind()),
            _ => None,
        }
    }

    fn element_tokens(&self, entry: usize) -> Vec<TokenId> {
        self.element_at(entry).map(CodeElement::tokens).unwrap_or_default()
    }

    fn remove_entry(&mut self, entry: usize) -> Vec<TokenId> {
        if entry >= self.entries.len() {
            return Vec::new();
        }
        let removed = self.entries.remove(entry);
        match removed.item {
            TableItem::Element(element) => element.tokens(),
            TableItem::Empty(line) => vec![line.token],
            TableItem::Comment(line) => line.comments,
        }
    }

    fn remove_body_item(&mut self, entry: usize, body: usize) -> Option<Vec<TokenId>> {
        let element = self.element_at_entry_mut(entry)?;
        if body >= element.body.len() {
            return None;
        }
        Some(element.body.remove(body).tokens())
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        if a == b || a >= self.entries.len() || b >= self.entries.len() {
            return;
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.entries.split_at_mut(high);
        std::mem::swap(&mut head[low].item, &mut tail[0].item);
    }

    fn describe_entry(&mut self, entry: usize, arena: &mut TokenArena, recognizers: &RecognizerSet) -> Vec<DescriptorIssue> {
        match self.element_at_entry_mut(entry) {
            Some(element) => describe_element(element, arena, recognizers),
            None => Vec::new(),
        }
    }
}
