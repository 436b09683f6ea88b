//! Cell mappers
//!
//!     Every cell is offered to the [MAPPERS] chain in order and the first mapper whose
//!     predicate accepts it types the token and attaches it to the model. The predicates are
//!     written to be mutually exclusive (comments and leading `...` cells are excluded from the
//!     data mappers), so order only matters for readability.
//!
//!     A cell no mapper accepts becomes an `Unknown` token on the open setting or variable, or
//!     on the header of the open section.

use tracing::{debug, trace};

use super::comments::{attach, open_comment};
use super::context::{CellContext, ParsingContext, Unit};
use super::state::ParsingState;
use crate::robot::model::{LocalSetting, Section, SectionKind, Setting, TableHeader, TableItem, Variable};
use crate::robot::recognizing::RecognizerSet;
use crate::robot::token::{LocalSettingKind, RobotTokenType, SettingKind, TableKind, TokenId, ValueRole, VariableKind};
use crate::robot::version::RobotVersion;

pub struct Mapper {
    pub name: &'static str,
    pub can_map: fn(&ParsingContext, &CellContext<'_>, ParsingState) -> bool,
    pub map: fn(&mut ParsingContext, &CellContext<'_>, TokenId),
}

pub static MAPPERS: &[Mapper] = &[
    Mapper {
        name: "table-header",
        can_map: |_, cell, _| cell.opens_table(),
        map: map_table_header,
    },
    Mapper {
        name: "header-column",
        can_map: |_, cell, state| matches!(state, ParsingState::TableHeader(_)) && cell.is_plain(),
        map: map_header_column,
    },
    Mapper {
        name: "setting-declaration",
        can_map: |_, cell, state| {
            state == ParsingState::TableInside(TableKind::Settings) && cell.is_first() && cell.is_plain()
        },
        map: map_setting_declaration,
    },
    Mapper {
        name: "setting-value",
        can_map: |ctx, cell, state| {
            matches!(state, ParsingState::SettingDeclaration(_))
                && matches!(ctx.unit, Unit::Setting(_))
                && cell.is_plain()
        },
        map: map_setting_value,
    },
    Mapper {
        name: "variable-declaration",
        can_map: |_, cell, state| {
            state == ParsingState::TableInside(TableKind::Variables) && cell.is_first() && cell.is_plain()
        },
        map: map_variable_declaration,
    },
    Mapper {
        name: "variable-value",
        can_map: |ctx, cell, state| {
            matches!(state, ParsingState::VariableDeclaration(_))
                && matches!(ctx.unit, Unit::Variable(_))
                && cell.is_plain()
        },
        map: map_variable_value,
    },
    Mapper {
        name: "element-declaration",
        can_map: |_, cell, state| match state {
            ParsingState::TableInside(table) => {
                table.element_kind().is_some() && cell.is_first() && !cell.indented && cell.is_plain()
            }
            _ => false,
        },
        map: map_element_declaration,
    },
    Mapper {
        name: "local-setting-declaration",
        can_map: |ctx, cell, state| {
            matches!(state, ParsingState::ElementDeclaration(_))
                && ctx.element.is_some()
                && cell.is_plain()
                && ctx.recognizers.local_setting(cell.text).is_some()
        },
        map: map_local_setting_declaration,
    },
    Mapper {
        name: "local-setting-value",
        can_map: |ctx, cell, state| {
            matches!(state, ParsingState::LocalSetting(..))
                && matches!(ctx.unit, Unit::BodySetting { .. })
                && cell.is_plain()
        },
        map: map_local_setting_value,
    },
    Mapper {
        name: "row-action",
        can_map: |ctx, cell, state| {
            matches!(state, ParsingState::ElementDeclaration(_))
                && ctx.element.is_some()
                && cell.is_plain()
                && ctx.recognizers.local_setting(cell.text).is_none()
        },
        map: map_row_action,
    },
    Mapper {
        name: "row-argument",
        can_map: |ctx, cell, state| {
            matches!(state, ParsingState::ExecutableRow(_))
                && matches!(ctx.unit, Unit::Row { .. })
                && cell.is_plain()
        },
        map: map_row_argument,
    },
    Mapper {
        name: "hash-comment",
        can_map: |_, cell, state| {
            cell.is_hash_comment() && !state.is_free() && state != ParsingState::Comment && !cell.opens_table()
        },
        map: map_hash_comment,
    },
    Mapper {
        name: "comment-continue",
        can_map: |_, _, state| state == ParsingState::Comment,
        map: map_comment_continue,
    },
    Mapper {
        name: "line-continuation",
        can_map: |ctx, cell, state| {
            cell.is_continuation()
                && !state.is_free()
                && state != ParsingState::Comment
                && ctx.unit_state() == Some(state)
        },
        map: map_line_continuation,
    },
    Mapper {
        name: "free-text",
        can_map: |_, cell, state| state.is_free() && !cell.opens_table(),
        map: map_free_text,
    },
];

/// Types `token` and attaches it to the model.
pub fn map_cell(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    let state = ctx.state();
    match MAPPERS.iter().find(|m| (m.can_map)(ctx, cell, state)) {
        Some(mapper) => {
            trace!(mapper = mapper.name, text = cell.text, ?state, "cell mapped");
            (mapper.map)(ctx, cell, token);
        }
        None => {
            trace!(text = cell.text, ?state, "cell unknown");
            attach_unknown(ctx, token);
        }
    }
}

fn map_table_header(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    ctx.element = None;
    ctx.comment_target = None;
    let section = match ctx.recognizers.table_header(cell.text) {
        Some(kind) => {
            ctx.set_type(token, RobotTokenType::TableHeader(kind));
            let section = ctx.file.push_section(Section {
                kind: SectionKind::Table(kind),
                header: Some(TableHeader::new(token)),
            });
            ctx.file.headers_of_mut(kind).push(section);
            ctx.stack.reset(ParsingState::TableInside(kind));
            ctx.stack.push(ParsingState::TableHeader(Some(kind)));
            debug!(table = ?kind, line = cell.position.line, "table opened");
            section
        }
        None => {
            ctx.set_type(token, RobotTokenType::UserOwnTableHeader);
            let section = ctx.file.push_section(Section {
                kind: SectionKind::UserOwn,
                header: Some(TableHeader::new(token)),
            });
            ctx.file.trash.headers.push(section);
            ctx.stack.reset(ParsingState::Trash);
            ctx.stack.push(ParsingState::TableHeader(None));
            let message = unrecognized_header(ctx.recognizers.version(), cell.text);
            ctx.error(cell.position, message);
            section
        }
    };
    ctx.section = section;
    ctx.unit = Unit::Header(section);
}

fn unrecognized_header(version: RobotVersion, text: &str) -> String {
    if RecognizerSet::for_version(RobotVersion::LATEST).table_header(text).is_some() {
        format!("Table header '{text}' is not supported in Robot Framework {version}")
    } else if RecognizerSet::for_version(RobotVersion::new(3, 0)).table_header(text).is_some() {
        format!("Table header '{text}' is not supported since Robot Framework 3.1, use '*** Keywords ***'")
    } else {
        format!("Unrecognized table header '{text}'")
    }
}

fn map_header_column(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    ctx.set_type(token, RobotTokenType::TableHeaderColumn);
    let section = ctx.section;
    match ctx.file.section_mut(section).header.as_mut() {
        Some(header) => header.columns.push(token),
        None => attach_unknown(ctx, token),
    }
}

fn map_setting_declaration(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    let (kind, deprecated) = ctx.recognizers.setting(cell.text);
    ctx.set_type(token, RobotTokenType::SettingDeclaration(kind));
    if kind == SettingKind::Unknown {
        let message = match RecognizerSet::for_version(RobotVersion::LATEST).setting(cell.text).0 {
            SettingKind::Unknown => format!("Unrecognized setting '{}'", cell.text),
            _ => format!(
                "Setting '{}' is not supported in Robot Framework {}",
                cell.text,
                ctx.recognizers.version()
            ),
        };
        ctx.error(cell.position, message);
    } else if deprecated {
        let message = format!("Setting '{}' is deprecated, use '{}'", cell.text, kind.representation());
        ctx.warn(cell.position, message);
    }
    let section = ctx.section;
    let entry = ctx
        .file
        .settings
        .push(section, TableItem::Element(Setting::new(kind, token)));
    ctx.unit = Unit::Setting(entry);
    ctx.stack.push(ParsingState::SettingDeclaration(kind));
}

fn map_setting_value(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    let Unit::Setting(entry) = ctx.unit else {
        return;
    };
    let file = &mut ctx.file;
    let Some(setting) = file.settings.element_at_entry_mut(entry) else {
        return;
    };
    let roles: Vec<ValueRole> = setting
        .values
        .iter()
        .filter_map(|id| match file.tokens.get(*id).token_type() {
            RobotTokenType::SettingValue(_, role) => Some(role),
            _ => None,
        })
        .collect();
    let role = setting.kind.value_role(roles.len(), &roles, cell.text);
    setting.values.push(token);
    let token_type = RobotTokenType::SettingValue(setting.kind, role);
    file.tokens.get_mut(token).set_primary_type(token_type);
}

fn map_variable_declaration(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    let kind = ctx.recognizers.variable(cell.text);
    ctx.set_type(token, RobotTokenType::VariableDeclaration(kind));
    if kind == VariableKind::Unknown {
        ctx.error(cell.position, format!("Invalid variable declaration '{}'", cell.text));
    }
    let section = ctx.section;
    let entry = ctx
        .file
        .variables
        .push(section, TableItem::Element(Variable::new(kind, token)));
    ctx.unit = Unit::Variable(entry);
    ctx.stack.push(ParsingState::VariableDeclaration(kind));
}

fn map_variable_value(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    let Unit::Variable(entry) = ctx.unit else {
        return;
    };
    ctx.set_type(token, RobotTokenType::VariableValue);
    if let Some(variable) = ctx.file.variables.element_at_entry_mut(entry) {
        variable.values.push(token);
    }
}

fn map_element_declaration(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    let Some(kind) = ctx.element_kind() else {
        return;
    };
    ctx.set_type(token, RobotTokenType::ElementName(kind));
    let section = ctx.section;
    let entry = ctx.file.code_table_mut(kind).push_element(section, token);
    trace!(kind = kind.describe(), name = cell.text, "element opened");
    ctx.element = Some(entry);
    ctx.unit = Unit::ElementName(entry);
    ctx.stack.push(ParsingState::ElementDeclaration(kind));
}

fn map_local_setting_declaration(ctx: &mut ParsingContext, cell: &CellContext<'_>, token: TokenId) {
    let (ParsingState::ElementDeclaration(element_kind), Some(entry)) = (ctx.state(), ctx.element) else {
        return;
    };
    let (mut kind, deprecated) = ctx
        .recognizers
        .local_setting(cell.text)
        .unwrap_or((LocalSettingKind::Unknown, false));
    if kind == LocalSettingKind::Unknown {
        let message = format!("Unrecognized setting '{}' in {}", cell.text, element_kind.describe());
        ctx.error(cell.position, message);
    } else if !ctx.file.code_table(element_kind).supports(kind) {
        let message = format!("Setting '{}' is not allowed in a {}", cell.text, element_kind.describe());
        ctx.error(cell.position, message);
        kind = LocalSettingKind::Unknown;
    } else if deprecated {
        let message = format!("Setting '{}' is deprecated, use '{}'", cell.text, kind.representation());
        ctx.warn(cell.position, message);
    }
    ctx.set_type(token, RobotTokenType::LocalSettingDeclaration(kind));
    let Some(body) = ctx
        .file
        .code_table_mut(element_kind)
        .push_body_setting(entry, LocalSetting::new(kind, token))
    else {
        return;
    };
    ctx.unit = Unit::BodySetting { entry, body };
    ctx.stack.push(ParsingState::LocalSetting(element_kind, kind));
}

fn map_local_setting_value(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    let (ParsingState::LocalSetting(element_kind, kind), Unit::BodySetting { entry, body }) = (ctx.state(), ctx.unit) else {
        return;
    };
    let Some(setting) = ctx.file.code_table_mut(element_kind).body_setting_mut(entry, body) else {
        return;
    };
    let role = kind.value_role(setting.values.len());
    setting.values.push(token);
    ctx.set_type(token, RobotTokenType::LocalSettingValue(kind, role));
}

fn map_row_action(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    let (ParsingState::ElementDeclaration(kind), Some(entry)) = (ctx.state(), ctx.element) else {
        return;
    };
    ctx.set_type(token, RobotTokenType::ActionName(kind));
    let Some(body) = ctx.file.code_table_mut(kind).push_body_row(entry, Some(token)) else {
        return;
    };
    ctx.unit = Unit::Row { entry, body };
    ctx.stack.push(ParsingState::ExecutableRow(kind));
}

fn map_row_argument(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    let (ParsingState::ExecutableRow(kind), Unit::Row { entry, body }) = (ctx.state(), ctx.unit) else {
        return;
    };
    let (table, arena) = ctx.file.code_table_and_tokens(kind);
    let Some(mut parts) = table.row_parts_mut(entry, body) else {
        return;
    };
    let token_type = if parts.action.is_none() {
        RobotTokenType::ActionName(kind)
    } else {
        RobotTokenType::ActionArgument(kind)
    };
    parts.push_cell(token);
    arena.get_mut(token).set_primary_type(token_type);
}

fn map_hash_comment(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    ctx.set_type(token, RobotTokenType::StartHashComment);
    let state = ctx.state();
    ctx.comment_target = open_comment(ctx, state);
    let attached = match ctx.comment_target {
        Some(target) => attach(ctx, target, token),
        None => false,
    };
    if !attached {
        attach_unknown(ctx, token);
    }
    ctx.stack.push(ParsingState::Comment);
}

fn map_comment_continue(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    ctx.set_type(token, RobotTokenType::CommentContinue);
    let attached = match ctx.comment_target {
        Some(target) => attach(ctx, target, token),
        None => false,
    };
    if !attached {
        attach_unknown(ctx, token);
    }
}

fn map_line_continuation(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    ctx.set_type(token, RobotTokenType::PreviousLineContinue);
    let kind = ctx.element_kind();
    let file = &mut ctx.file;
    let attached = match (ctx.unit, kind) {
        (Unit::Header(section), _) => file
            .section_mut(section)
            .header
            .as_mut()
            .map(|h| h.continuations.push(token))
            .is_some(),
        (Unit::Setting(entry), _) => file
            .settings
            .element_at_entry_mut(entry)
            .map(|s| s.continuations.push(token))
            .is_some(),
        (Unit::Variable(entry), _) => file
            .variables
            .element_at_entry_mut(entry)
            .map(|v| v.continuations.push(token))
            .is_some(),
        (Unit::BodySetting { entry, body }, Some(kind)) => file
            .code_table_mut(kind)
            .body_setting_mut(entry, body)
            .map(|s| s.continuations.push(token))
            .is_some(),
        (Unit::Row { entry, body }, Some(kind)) => file
            .code_table_mut(kind)
            .row_parts_mut(entry, body)
            .map(|parts| parts.continuations.push(token))
            .is_some(),
        _ => false,
    };
    if !attached {
        attach_unknown(ctx, token);
    }
}

fn map_free_text(ctx: &mut ParsingContext, _: &CellContext<'_>, token: TokenId) {
    ctx.set_type(token, RobotTokenType::FreeText);
    ctx.push_free(token);
}

/// Attaches a token no mapper claimed to the closest owner that keeps unknown tokens.
pub fn attach_unknown(ctx: &mut ParsingContext, token: TokenId) {
    let kind = ctx.element_kind();
    let section = ctx.section;
    let file = &mut ctx.file;
    let attached = match (ctx.unit, kind) {
        (Unit::Setting(entry), _) => file
            .settings
            .element_at_entry_mut(entry)
            .map(|s| s.unknown.push(token))
            .is_some(),
        (Unit::Variable(entry), _) => file
            .variables
            .element_at_entry_mut(entry)
            .map(|v| v.unknown.push(token))
            .is_some(),
        (Unit::BodySetting { entry, body }, Some(kind)) => file
            .code_table_mut(kind)
            .body_setting_mut(entry, body)
            .map(|s| s.unknown.push(token))
            .is_some(),
        _ => false,
    };
    if attached {
        return;
    }
    if let Some(header) = file.section_mut(section).header.as_mut() {
        header.unknown.push(token);
        return;
    }
    ctx.push_free(token);
}
