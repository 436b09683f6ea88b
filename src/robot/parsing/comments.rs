//! Comment mappers
//!
//!     A `#` cell starts a comment that runs to the end of the line. Who owns the comment
//!     depends on the state the line was in when the `#` appeared; the first entry of
//!     [COMMENT_MAPPERS] that applies to that state picks (or creates) the owner, and every
//!     later cell of the line is appended to the same owner.

use super::context::{CommentTarget, ParsingContext, Unit};
use super::state::ParsingState;
use crate::robot::model::{CommentLine, TableItem};
use crate::robot::token::{TableKind, TokenId};

pub struct CommentMapper {
    pub name: &'static str,
    pub applies: fn(ParsingState) -> bool,
    pub target: fn(&mut ParsingContext, ParsingState) -> Option<CommentTarget>,
}

pub static COMMENT_MAPPERS: &[CommentMapper] = &[
    CommentMapper {
        name: "header",
        applies: |state| matches!(state, ParsingState::TableHeader(_)),
        target: |ctx, _| Some(CommentTarget::Header(ctx.section)),
    },
    CommentMapper {
        name: "setting",
        applies: |state| matches!(state, ParsingState::SettingDeclaration(_)),
        target: |ctx, _| match ctx.unit {
            Unit::Setting(entry) => Some(CommentTarget::Setting(entry)),
            _ => None,
        },
    },
    CommentMapper {
        name: "variable",
        applies: |state| matches!(state, ParsingState::VariableDeclaration(_)),
        target: |ctx, _| match ctx.unit {
            Unit::Variable(entry) => Some(CommentTarget::Variable(entry)),
            _ => None,
        },
    },
    CommentMapper {
        name: "local-setting",
        applies: |state| matches!(state, ParsingState::LocalSetting(..)),
        target: |ctx, state| match (ctx.unit, state) {
            (Unit::BodySetting { entry, body }, ParsingState::LocalSetting(kind, _)) => {
                Some(CommentTarget::BodySetting { kind, entry, body })
            }
            _ => None,
        },
    },
    CommentMapper {
        name: "row",
        applies: |state| matches!(state, ParsingState::ExecutableRow(_)),
        target: |ctx, state| match (ctx.unit, state) {
            (Unit::Row { entry, body }, ParsingState::ExecutableRow(kind)) => {
                Some(CommentTarget::Row { kind, entry, body })
            }
            _ => None,
        },
    },
    CommentMapper {
        name: "comment-row",
        applies: |state| matches!(state, ParsingState::ElementDeclaration(_)),
        target: |ctx, state| {
            let ParsingState::ElementDeclaration(kind) = state else {
                return None;
            };
            let entry = ctx.element?;
            let body = ctx.file.code_table_mut(kind).push_body_row(entry, None)?;
            Some(CommentTarget::Row { kind, entry, body })
        },
    },
    CommentMapper {
        name: "table-line",
        applies: |state| matches!(state, ParsingState::TableInside(_)),
        target: |ctx, state| {
            let ParsingState::TableInside(table) = state else {
                return None;
            };
            let section = ctx.section;
            let entry = match table {
                TableKind::Settings => ctx
                    .file
                    .settings
                    .push(section, TableItem::Comment(CommentLine { comments: Vec::new() })),
                TableKind::Variables => ctx
                    .file
                    .variables
                    .push(section, TableItem::Comment(CommentLine { comments: Vec::new() })),
                TableKind::TestCases | TableKind::Tasks | TableKind::Keywords => {
                    let kind = table.element_kind()?;
                    ctx.file
                        .code_table_mut(kind)
                        .push_comment(section, CommentLine { comments: Vec::new() })
                }
                TableKind::Comments => return None,
            };
            Some(CommentTarget::TableLine { table, entry })
        },
    },
];

/// Picks the owner for a comment starting in `state`.
pub fn open_comment(ctx: &mut ParsingContext, state: ParsingState) -> Option<CommentTarget> {
    let mapper = COMMENT_MAPPERS.iter().find(|m| (m.applies)(state))?;
    tracing::trace!(mapper = mapper.name, ?state, "comment owner");
    (mapper.target)(ctx, state)
}

/// Appends a comment token to its owner. Returns false when the owner vanished.
pub fn attach(ctx: &mut ParsingContext, target: CommentTarget, token: TokenId) -> bool {
    let file = &mut ctx.file;
    match target {
        CommentTarget::Header(section) => file
            .section_mut(section)
            .header
            .as_mut()
            .map(|h| h.comments.push(token))
            .is_some(),
        CommentTarget::Setting(entry) => file
            .settings
            .element_at_entry_mut(entry)
            .map(|s| s.comments.push(token))
            .is_some(),
        CommentTarget::Variable(entry) => file
            .variables
            .element_at_entry_mut(entry)
            .map(|v| v.comments.push(token))
            .is_some(),
        CommentTarget::BodySetting { kind, entry, body } => file
            .code_table_mut(kind)
            .body_setting_mut(entry, body)
            .map(|s| s.comments.push(token))
            .is_some(),
        CommentTarget::Row { kind, entry, body } => file
            .code_table_mut(kind)
            .row_parts_mut(entry, body)
            .map(|parts| parts.comments.push(token))
            .is_some(),
        CommentTarget::TableLine { table, entry } => {
            let line = match table {
                TableKind::Settings => file.settings.comment_at_mut(entry),
                TableKind::Variables => file.variables.comment_at_mut(entry),
                TableKind::Comments => None,
                code => match code.element_kind() {
                    Some(kind) => file.code_table_mut(kind).comment_line_mut(entry),
                    None => None,
                },
            };
            line.map(|l| l.comments.push(token)).is_some()
        }
    }
}
