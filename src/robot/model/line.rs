//! Original lines

use crate::robot::reading::{EndOfLine, Separator};
use crate::robot::token::TokenId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineElement {
    Token(TokenId),
    Separator(Separator),
}

/// One line as read: tokens and separators in order, plus the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotLine {
    pub(crate) number: usize,
    pub(crate) elements: Vec<LineElement>,
    pub(crate) eol: EndOfLine,
    pub(crate) start_offset: usize,
}

impl RobotLine {
    pub(crate) fn new(number: usize, eol: EndOfLine, start_offset: usize) -> Self {
        Self {
            number,
            elements: Vec::new(),
            eol,
            start_offset,
        }
    }

    /// 1-based line number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn elements(&self) -> &[LineElement] {
        &self.elements
    }

    pub fn eol(&self) -> EndOfLine {
        self.eol
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.elements.iter().filter_map(|e| match e {
            LineElement::Token(id) => Some(*id),
            LineElement::Separator(_) => None,
        })
    }
}
