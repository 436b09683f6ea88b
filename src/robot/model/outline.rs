//! Serializable summary of a file, for printing

use serde::Serialize;

use super::file::RobotFile;
use super::row::{BodyItem, CodeElement, RowOwner};
use super::table::Table;
use crate::robot::reading::FileFormat;
use crate::robot::token::{TableKind, TokenArena, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutline {
    pub version: String,
    pub format: FileFormat,
    pub tables: Vec<TableOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutline {
    pub kind: TableKind,
    pub headers: usize,
    pub entries: Vec<EntryOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutline {
    pub name: String,
    pub line: Option<usize>,
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<String>,
}

impl FileOutline {
    pub fn of(file: &RobotFile) -> Self {
        let arena = file.tokens();
        let mut tables = Vec::new();
        for kind in TableKind::ALL {
            if !file.is_table_present(kind) {
                continue;
            }
            let (headers, entries) = match kind {
                TableKind::Settings => declarations(&file.settings, arena, |s| (s.declaration(), s.values().to_vec())),
                TableKind::Variables => declarations(&file.variables, arena, |v| (v.declaration(), v.values().to_vec())),
                TableKind::TestCases => code_elements(&file.test_cases, arena),
                TableKind::Tasks => code_elements(&file.tasks, arena),
                TableKind::Keywords => code_elements(&file.keywords, arena),
                TableKind::Comments => (file.comments.headers().len(), Vec::new()),
            };
            tables.push(TableOutline { kind, headers, entries });
        }
        Self {
            version: file.version().to_string(),
            format: file.format(),
            tables,
        }
    }
}

fn line_of(arena: &TokenArena, id: TokenId) -> Option<usize> {
    arena.get(id).position().map(|p| p.line)
}

fn texts(arena: &TokenArena, ids: &[TokenId]) -> Vec<String> {
    ids.iter().map(|id| arena.text(*id).to_string()).collect()
}

fn declarations<T>(
    table: &Table<T>,
    arena: &TokenArena,
    parts: impl Fn(&T) -> (TokenId, Vec<TokenId>),
) -> (usize, Vec<EntryOutline>) {
    let entries = table
        .elements()
        .map(|element| {
            let (declaration, values) = parts(element);
            EntryOutline {
                name: arena.text(declaration).to_string(),
                line: line_of(arena, declaration),
                values: texts(arena, &values),
                body: Vec::new(),
            }
        })
        .collect();
    (table.headers().len(), entries)
}

fn code_elements<O: RowOwner>(table: &Table<CodeElement<O>>, arena: &TokenArena) -> (usize, Vec<EntryOutline>) {
    let entries = table
        .elements()
        .map(|element| EntryOutline {
            name: element.name_text(arena).to_string(),
            line: line_of(arena, element.name()),
            values: Vec::new(),
            body: element
                .body()
                .iter()
                .filter_map(|item| match item {
                    BodyItem::Setting(s) => {
                        let mut cells = vec![s.declaration()];
                        cells.extend(s.values());
                        Some(texts(arena, &cells).join(" | "))
                    }
                    BodyItem::Row(row) if !row.is_comment_only() => Some(texts(arena, &row.cells()).join(" | ")),
                    _ => None,
                })
                .collect(),
        })
        .collect();
    (table.headers().len(), entries)
}
