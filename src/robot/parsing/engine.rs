//! Line loop
//!
//!     Reads lines one by one, splits them into separators and cells, records the original
//!     line in the model and hands every cell to the mapper chain. Line boundaries drive the
//!     state stack:
//!
//!         - line-scoped states (comments, header lines) end with their line
//!         - a `...` line re-enters the state of the unit it continues
//!         - a `#` line leaves the open unit alone, so a later `...` still continues it
//!         - any other line closes the unit, and a non-indented one also closes the open
//!           test case, task or keyword
//!
//!     Empty lines never change states; they become a single pretty-align token attached to
//!     the open element or table.

use std::io::Read;

use tracing::debug;

use super::context::{CellContext, ParsingContext, Unit};
use super::mappers::map_cell;
use super::post;
use super::{ParseOptions, ParseOutput};
use crate::robot::error::ReadError;
use crate::robot::model::{EmptyLine, LineElement, RobotFile, RobotLine, TableItem};
use crate::robot::reading::{split_line, Line, LinePiece, LineReader, SplitLine};
use crate::robot::recognizing;
use crate::robot::token::{FilePosition, RobotToken, RobotTokenType, TableKind, TokenId};

pub(crate) fn run<R: Read>(source: R, options: &ParseOptions) -> Result<ParseOutput, ReadError> {
    let mut reader = LineReader::new(source);
    let mut ctx = ParsingContext::new(RobotFile::new(options.version, options.format));
    while let Some(line) = reader.read_line()? {
        parse_line(&mut ctx, line);
    }
    ctx.file.has_bom = reader.has_bom();
    post::finish(&mut ctx);
    debug!(
        lines = ctx.file.lines.len(),
        tokens = ctx.file.tokens.len(),
        issues = ctx.issues.len(),
        "file parsed"
    );
    Ok(ParseOutput::new(ctx.file, ctx.issues))
}

fn parse_line(ctx: &mut ParsingContext, line: Line) {
    let split = split_line(&line.text, ctx.file.format());
    let mut robot_line = RobotLine::new(line.number, line.eol, line.start_offset);

    if !split.has_cells() {
        let position = FilePosition::new(line.number, 0, line.start_offset);
        let token = ctx.file.alloc(RobotToken::parsed(line.text.as_str(), position));
        ctx.set_type(token, RobotTokenType::PrettyAlignSpace);
        attach_empty(ctx, token);
        robot_line.elements.push(LineElement::Token(token));
        ctx.file.lines.push(robot_line);
        return;
    }

    begin_line(ctx, &split);
    let indented = split.is_indented();
    let mut index = 0;
    for piece in split.pieces {
        match piece {
            LinePiece::Separator(separator) => robot_line.elements.push(LineElement::Separator(separator)),
            LinePiece::Cell(cell) => {
                let position = FilePosition::new(line.number, cell.start, line.start_offset + cell.start);
                let token = ctx.file.alloc(RobotToken::parsed(cell.text.as_str(), position));
                let cell_context = CellContext {
                    text: &cell.text,
                    index,
                    indented,
                    position,
                };
                map_cell(ctx, &cell_context, token);
                robot_line.elements.push(LineElement::Token(token));
                index += 1;
            }
        }
    }

    ctx.stack.pop_line_scoped();
    ctx.comment_target = None;
    ctx.file.lines.push(robot_line);
}

fn begin_line(ctx: &mut ParsingContext, split: &SplitLine) {
    let Some(first) = split.cells().next() else {
        return;
    };
    if ctx.state().is_free() {
        ctx.unit = Unit::None;
        return;
    }
    ctx.stack.pop_to_element();
    if recognizing::is_line_continuation(&first.text) {
        if let Some(state) = ctx.unit_state() {
            ctx.stack.push(state);
        }
        return;
    }
    if recognizing::is_hash_comment(&first.text) {
        return;
    }
    ctx.unit = Unit::None;
    if !split.is_indented() && ctx.element.is_some() {
        ctx.stack.pop_to_table();
        ctx.element = None;
    }
}

fn attach_empty(ctx: &mut ParsingContext, token: TokenId) {
    if ctx.state().is_free() {
        ctx.unit = Unit::None;
        ctx.push_free(token);
        ctx.unit = Unit::None;
        return;
    }
    let section = ctx.section;
    let line = EmptyLine { token };
    if let (Some(kind), Some(entry)) = (ctx.element_kind(), ctx.element) {
        if ctx.file.code_table_mut(kind).push_body_empty(entry, line.clone()).is_some() {
            return;
        }
    }
    match ctx.table() {
        Some(TableKind::Settings) => {
            ctx.file.settings.push(section, TableItem::Empty(line));
        }
        Some(TableKind::Variables) => {
            ctx.file.variables.push(section, TableItem::Empty(line));
        }
        Some(table) => match table.element_kind() {
            Some(kind) => {
                ctx.file.code_table_mut(kind).push_empty(section, line);
            }
            None => ctx.push_free(token),
        },
        None => ctx.push_free(token),
    }
}
