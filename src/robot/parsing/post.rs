//! Checks that need a complete file

use super::context::ParsingContext;
use super::issues::ParseIssue;
use crate::robot::model::TableItem;
use crate::robot::token::{ElementKind, FilePosition, RobotTokenType, TokenClass, VariableKind};
use crate::robot::variables::VariableExtractor;

pub(crate) fn finish(ctx: &mut ParsingContext) {
    check_setting_names(ctx);
    check_variables(ctx);
    describe_rows(ctx);
    extract_variables(ctx);
    ctx.issues.sort_by_key(|issue| (issue.line, issue.column));
}

/// `Library`, `Resource` and `Variables` need a first value, possibly on a `...` line.
fn check_setting_names(ctx: &mut ParsingContext) {
    let missing: Vec<_> = ctx
        .file
        .settings
        .elements()
        .filter(|s| s.kind().requires_name() && s.values().is_empty())
        .map(|s| s.declaration())
        .collect();
    for declaration in missing {
        let token = ctx.file.token(declaration);
        let position = token.position().unwrap_or_else(FilePosition::start);
        let message = format!("Setting '{}' requires a name", token.text());
        ctx.error(position, message);
    }
}

/// A scalar with several values is the old way of declaring a list.
fn check_variables(ctx: &mut ParsingContext) {
    let version = ctx.file.version();
    let mut deprecated = Vec::new();
    for entry in &mut ctx.file.variables.entries {
        let TableItem::Element(variable) = &mut entry.item else {
            continue;
        };
        if variable.kind == VariableKind::Scalar && variable.values.len() > 1 {
            variable.kind = VariableKind::ScalarAsList;
            deprecated.push(variable.declaration);
        }
    }
    for declaration in deprecated {
        ctx.set_type(declaration, RobotTokenType::VariableDeclaration(VariableKind::ScalarAsList));
        if version.is_at_least(2, 9) {
            let token = ctx.file.token(declaration);
            let position = token.position().unwrap_or_else(FilePosition::start);
            let message = format!(
                "Scalar variable '{}' with several values is deprecated, use a list variable",
                token.text()
            );
            ctx.warn(position, message);
        }
    }
}

fn describe_rows(ctx: &mut ParsingContext) {
    let mut found = Vec::new();
    for kind in [ElementKind::TestCase, ElementKind::Task, ElementKind::Keyword] {
        let (table, arena) = ctx.file.code_table_and_tokens(kind);
        found.extend(table.describe_all(arena, &ctx.recognizers));
    }
    for issue in found {
        let position = ctx
            .file
            .token(issue.token)
            .position()
            .unwrap_or_else(FilePosition::start);
        ctx.warn(position, issue.message);
    }
}

/// Validates variable syntax in every data token and tags tokens that use variables.
fn extract_variables(ctx: &mut ParsingContext) {
    let extractor = VariableExtractor::new(ctx.file.version());
    let mut issues = Vec::new();
    let mut users = Vec::new();
    for (id, token) in ctx.file.tokens.iter() {
        let checked = match token.token_type() {
            RobotTokenType::TableHeader(_) | RobotTokenType::UserOwnTableHeader => false,
            other => matches!(
                other.class(),
                TokenClass::Declaration | TokenClass::Value | TokenClass::Action | TokenClass::Argument
            ),
        };
        let Some(position) = token.position().filter(|_| checked) else {
            continue;
        };
        let extraction = extractor.extract_at(token.text(), position);
        for error in &extraction.errors {
            issues.push(ParseIssue::error(error.position, error.to_string()));
        }
        if extraction.has_variables() {
            users.push(id);
        }
    }
    for id in users {
        ctx.file.tokens.get_mut(id).add_type(RobotTokenType::VariableUsage);
    }
    ctx.issues.extend(issues);
}
