//! Parsing states
//!
//!     The stack always has a table-entry state at the bottom (`Trash` before the first header
//!     and inside unrecognized tables, `TableInside` otherwise). Above it sit, at most, an
//!     element declaration, one row-level state and a line-scoped state:
//!
//!         TableInside(Keywords) -> ElementDeclaration(Keyword) -> ExecutableRow(Keyword) -> Comment
//!
//!     Popping the table-entry state or reading an empty stack is a parser bug and panics.

use crate::robot::token::{ElementKind, LocalSettingKind, SettingKind, TableKind, VariableKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsingState {
    /// Before the first table and inside unrecognized tables.
    Trash,
    TableInside(TableKind),
    /// The header line; `None` for unrecognized headers.
    TableHeader(Option<TableKind>),
    SettingDeclaration(SettingKind),
    VariableDeclaration(VariableKind),
    /// Inside a test case, task or keyword.
    ElementDeclaration(ElementKind),
    LocalSetting(ElementKind, LocalSettingKind),
    ExecutableRow(ElementKind),
    /// After a `#` cell, until the end of the line.
    Comment,
}

impl ParsingState {
    pub fn is_table_entry(self) -> bool {
        matches!(self, ParsingState::Trash | ParsingState::TableInside(_))
    }

    /// States whose cells are kept as free text.
    pub fn is_free(self) -> bool {
        matches!(
            self,
            ParsingState::Trash | ParsingState::TableInside(TableKind::Comments)
        )
    }

    /// States that never outlive the line that opened them.
    pub fn is_line_scoped(self) -> bool {
        matches!(self, ParsingState::Comment | ParsingState::TableHeader(_))
    }
}

#[derive(Debug, Clone)]
pub struct StateStack {
    states: Vec<ParsingState>,
}

impl StateStack {
    pub fn new(entry: ParsingState) -> Self {
        assert!(entry.is_table_entry(), "stack must start at a table entry state");
        Self {
            states: vec![entry],
        }
    }

    pub fn current(&self) -> ParsingState {
        *self
            .states
            .last()
            .expect("parsing state stack is never empty")
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn push(&mut self, state: ParsingState) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> ParsingState {
        assert!(
            self.states.len() > 1,
            "popped below the table entry state {:?}",
            self.states.first()
        );
        self.states.pop().expect("checked above")
    }

    /// Replaces the whole stack with a new table entry state.
    pub fn reset(&mut self, entry: ParsingState) {
        assert!(entry.is_table_entry(), "{entry:?} is not a table entry state");
        self.states.clear();
        self.states.push(entry);
    }

    /// Drops line-scoped states from the top.
    pub fn pop_line_scoped(&mut self) {
        while self.current().is_line_scoped() {
            self.pop();
        }
    }

    /// Pops down to the element declaration, or to the table entry when there is none.
    pub fn pop_to_element(&mut self) {
        while !matches!(
            self.current(),
            ParsingState::ElementDeclaration(_) | ParsingState::Trash | ParsingState::TableInside(_)
        ) {
            self.pop();
        }
    }

    pub fn pop_to_table(&mut self) {
        while !self.current().is_table_entry() {
            self.pop();
        }
    }

    pub fn table_entry(&self) -> ParsingState {
        self.states[0]
    }

    pub fn contains(&self, state: ParsingState) -> bool {
        self.states.contains(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_back_to_the_element() {
        let mut stack = StateStack::new(ParsingState::TableInside(TableKind::Keywords));
        stack.push(ParsingState::ElementDeclaration(ElementKind::Keyword));
        stack.push(ParsingState::ExecutableRow(ElementKind::Keyword));
        stack.push(ParsingState::Comment);
        stack.pop_line_scoped();
        assert_eq!(stack.current(), ParsingState::ExecutableRow(ElementKind::Keyword));
        stack.pop_to_element();
        assert_eq!(stack.current(), ParsingState::ElementDeclaration(ElementKind::Keyword));
        stack.pop_to_table();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    #[should_panic(expected = "popped below the table entry state")]
    fn popping_the_table_entry_is_a_bug() {
        let mut stack = StateStack::new(ParsingState::Trash);
        stack.pop();
    }

    #[test]
    fn free_states() {
        assert!(ParsingState::Trash.is_free());
        assert!(ParsingState::TableInside(TableKind::Comments).is_free());
        assert!(!ParsingState::TableInside(TableKind::Settings).is_free());
    }
}
