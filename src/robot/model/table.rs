//! Tables and sections

use serde::Serialize;

use super::elements::{CommentLine, EmptyLine, TableHeader};
use crate::robot::token::TableKind;

/// Index of a section in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionId(pub(crate) usize);

impl SectionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    /// Lines before the first table header.
    Preamble,
    Table(TableKind),
    /// A `*`-prefixed header naming no known table. Its lines are kept verbatim.
    UserOwn,
}

/// A stretch of the file opened by one header (or the preamble, which has none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub(crate) kind: SectionKind,
    pub(crate) header: Option<TableHeader>,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn header(&self) -> Option<&TableHeader> {
        self.header.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableItem<T> {
    Element(T),
    Empty(EmptyLine),
    Comment(CommentLine),
}

/// A table item tagged with the section it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry<T> {
    pub(crate) section: SectionId,
    pub(crate) item: TableItem<T>,
}

impl<T> TableEntry<T> {
    pub fn section(&self) -> SectionId {
        self.section
    }

    pub fn item(&self) -> &TableItem<T> {
        &self.item
    }

    pub fn element(&self) -> Option<&T> {
        match &self.item {
            TableItem::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut T> {
        match &mut self.item {
            TableItem::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Ordered headers (as section ids) and ordered entries of one table kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<T> {
    pub(crate) headers: Vec<SectionId>,
    pub(crate) entries: Vec<TableEntry<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    /// True only when at least one header for this table was seen (or generated).
    pub fn is_present(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn headers(&self) -> &[SectionId] {
        &self.headers
    }

    pub fn entries(&self) -> &[TableEntry<T>] {
        &self.entries
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(TableEntry::element)
    }

    pub fn element(&self, index: usize) -> Option<&T> {
        self.elements().nth(index)
    }

    pub fn len(&self) -> usize {
        self.elements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry position of the `index`-th element.
    pub(crate) fn entry_of_element(&self, index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.element().is_some())
            .map(|(i, _)| i)
            .nth(index)
    }

    pub(crate) fn element_at_entry_mut(&mut self, entry: usize) -> Option<&mut T> {
        self.entries.get_mut(entry).and_then(TableEntry::element_mut)
    }

    pub(crate) fn push(&mut self, section: SectionId, item: TableItem<T>) -> usize {
        self.entries.push(TableEntry { section, item });
        self.entries.len() - 1
    }

    pub(crate) fn comment_at_mut(&mut self, entry: usize) -> Option<&mut CommentLine> {
        match &mut self.entries.get_mut(entry)?.item {
            TableItem::Comment(line) => Some(line),
            _ => None,
        }
    }

    /// Section new elements are appended to.
    pub(crate) fn last_section(&self) -> Option<SectionId> {
        self.headers.last().copied()
    }
}
