//! Row descriptors
//!
//!     A descriptor is the decomposition of an executable row: which cells assign, which cell
//!     is the keyword, which are its arguments, and where the enclosing FOR loop starts.
//!     Descriptors are derived data. They are recomputed for a whole element body after
//!     parsing and after every update that touches rows, never edited in place.
//!
//!     Old-style loops (`: FOR` followed by `\` rows) are linked by walking backward from the
//!     `\` row: empty lines, local settings and comment-only rows are skipped; the first other
//!     row must be the declaration or a `\` row that already knows its start. New-style
//!     `FOR` ... `END` bodies are linked with a stack of open loops.

use once_cell::sync::Lazy;
use regex::Regex;

use super::row::{BodyItem, CodeElement, RowOwner};
use crate::robot::recognizing::RecognizerSet;
use crate::robot::token::{RobotTokenType, TokenArena, TokenId};
use crate::robot::variables::{VariableExtractor, VariableUse};

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[$@&]\{.+\}\s?=?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKind {
    #[default]
    Simple,
    ForLoopDeclaration,
    /// `\` body row of an old-style loop.
    ForLoopContinue,
    ForLoopEnd,
    /// No action, only comments.
    Comment,
}

/// `FOR ${var} IN values...`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForLoopParts {
    pub variables: Vec<TokenId>,
    pub in_token: Option<TokenId>,
    pub values: Vec<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowDescriptor {
    pub kind: RowKind,
    pub assignments: Vec<TokenId>,
    pub keyword_action: Option<TokenId>,
    pub keyword_arguments: Vec<TokenId>,
    /// Body index of the loop declaration this row belongs to.
    pub for_loop_start: Option<usize>,
    pub for_loop: Option<ForLoopParts>,
    pub variable_uses: Vec<VariableUse>,
    pub issues: Vec<String>,
}

impl RowDescriptor {
    pub fn is_for_loop_row(&self) -> bool {
        self.for_loop_start.is_some()
    }
}

/// Warning raised while describing a body, anchored on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorIssue {
    pub token: TokenId,
    pub message: String,
}

/// Recomputes the descriptor of every row in `element`.
pub(crate) fn describe_element<O: RowOwner>(
    element: &mut CodeElement<O>,
    arena: &mut TokenArena,
    recognizers: &RecognizerSet,
) -> Vec<DescriptorIssue> {
    let extractor = VariableExtractor::new(recognizers.version());
    let mut issues = Vec::new();
    let mut open_loops: Vec<usize> = Vec::new();

    for index in 0..element.body.len() {
        let (action, arguments) = match &element.body[index] {
            BodyItem::Row(row) => (row.action, row.arguments.clone()),
            _ => continue,
        };

        let mut descriptor = RowDescriptor::default();
        let Some(action) = action else {
            descriptor.kind = RowKind::Comment;
            set_descriptor(element, index, descriptor);
            continue;
        };

        match recognizers.for_loop_marker(arena.text(action)) {
            Some(RobotTokenType::ForDeclaration) => {
                arena.get_mut(action).add_type(RobotTokenType::ForDeclaration);
                descriptor.kind = RowKind::ForLoopDeclaration;
                descriptor.for_loop_start = Some(index);
                descriptor.for_loop = Some(for_loop_parts(&arguments, arena, recognizers));
                if arena.text(action) == "FOR" {
                    open_loops.push(index);
                }
            }
            Some(RobotTokenType::ForEnd) => {
                arena.get_mut(action).add_type(RobotTokenType::ForEnd);
                descriptor.kind = RowKind::ForLoopEnd;
                descriptor.for_loop_start = open_loops.pop();
                if descriptor.for_loop_start.is_none() {
                    let message = "END without opening FOR".to_string();
                    descriptor.issues.push(message.clone());
                    issues.push(DescriptorIssue { token: action, message });
                }
            }
            Some(RobotTokenType::ForContinue) => {
                arena.get_mut(action).add_type(RobotTokenType::ForContinue);
                descriptor.kind = RowKind::ForLoopContinue;
                descriptor.for_loop_start = find_loop_start(&element.body, index);
                if descriptor.for_loop_start.is_none() {
                    let message = "FOR loop continuation without FOR declaration".to_string();
                    descriptor.issues.push(message.clone());
                    issues.push(DescriptorIssue { token: action, message });
                }
                describe_keyword(&mut descriptor, &arguments, arena);
            }
            _ => {
                descriptor.for_loop_start = open_loops.last().copied();
                let mut cells = vec![action];
                cells.extend(&arguments);
                describe_keyword(&mut descriptor, &cells, arena);
            }
        }

        for id in descriptor
            .keyword_arguments
            .iter()
            .chain(descriptor.for_loop.iter().flat_map(|f| &f.values))
        {
            let token = arena.get(*id);
            let Some(position) = token.position() else {
                continue;
            };
            let extraction = extractor.extract_at(token.text(), position);
            descriptor.variable_uses.extend(extraction.variables().cloned());
        }
        set_descriptor(element, index, descriptor);
    }
    issues
}

fn set_descriptor<O: RowOwner>(element: &mut CodeElement<O>, index: usize, descriptor: RowDescriptor) {
    if let BodyItem::Row(row) = &mut element.body[index] {
        row.descriptor = descriptor;
    }
}

fn for_loop_parts(arguments: &[TokenId], arena: &mut TokenArena, recognizers: &RecognizerSet) -> ForLoopParts {
    let mut parts = ForLoopParts::default();
    for id in arguments {
        if parts.in_token.is_some() {
            parts.values.push(*id);
        } else if recognizers.for_loop_marker(arena.text(*id)) == Some(RobotTokenType::ForIn) {
            arena.get_mut(*id).add_type(RobotTokenType::ForIn);
            parts.in_token = Some(*id);
        } else {
            parts.variables.push(*id);
        }
    }
    parts
}

/// Leading assignments, then the keyword, then its arguments.
fn describe_keyword(descriptor: &mut RowDescriptor, cells: &[TokenId], arena: &mut TokenArena) {
    let mut rest = cells.iter().copied();
    for id in rest.by_ref() {
        if ASSIGNMENT.is_match(arena.text(id)) {
            arena.get_mut(id).add_type(RobotTokenType::Assignment);
            descriptor.assignments.push(id);
        } else {
            descriptor.keyword_action = Some(id);
            break;
        }
    }
    descriptor.keyword_arguments = rest.collect();
}

fn find_loop_start<O: RowOwner>(body: &[BodyItem<O>], index: usize) -> Option<usize> {
    for previous in (0..index).rev() {
        let row = match &body[previous] {
            BodyItem::Row(row) if !row.is_comment_only() => row,
            _ => continue,
        };
        return match row.descriptor.kind {
            RowKind::ForLoopDeclaration => Some(previous),
            RowKind::ForLoopContinue => row.descriptor.for_loop_start,
            _ => None,
        };
    }
    None
}
