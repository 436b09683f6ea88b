//! Model update operations
//!
//!     The only way to change a parsed file. Every operation allocates new tokens as dirty
//!     tokens without a position, marks dropped tokens removed (they stay in the arena and on
//!     their original lines so the dumper can drop them together with their separators), and
//!     recomputes row descriptors of the element it touched.

use thiserror::Error;

use super::elements::{LocalSetting, Setting, TableHeader, Variable};
use super::file::RobotFile;
use super::table::{Section, SectionId, SectionKind, TableItem};
use crate::robot::reading::EndOfLine;
use crate::robot::recognizing::RecognizerSet;
use crate::robot::token::{
    ElementKind, LocalSettingKind, RobotToken, RobotTokenType, SettingKind, TableKind, TokenId,
    ValueRole, VariableKind,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("no {} at index {index}", .kind.describe())]
    NoSuchElement { kind: ElementKind, index: usize },

    #[error("no row at body index {index}")]
    NoSuchRow { index: usize },

    #[error("{} is not allowed in a {}", .setting.representation(), .kind.describe())]
    UnsupportedSetting {
        kind: ElementKind,
        setting: LocalSettingKind,
    },

    #[error("cannot add a setting of unknown kind")]
    UnknownSetting,

    #[error("invalid variable declaration '{0}'")]
    InvalidVariable(String),

    #[error("no {table:?} entry at index {index}")]
    NoSuchEntry { table: TableKind, index: usize },
}

impl RobotFile {
    /// Returns the section new entries of `kind` go to, generating a header when the table
    /// does not exist yet.
    pub fn ensure_table(&mut self, kind: TableKind) -> SectionId {
        if let Some(last) = self.headers_of_mut(kind).last() {
            return *last;
        }
        let declaration = self.alloc(RobotToken::created(kind.header_text(), RobotTokenType::TableHeader(kind)));
        let section = self.push_section(Section {
            kind: SectionKind::Table(kind),
            header: Some(TableHeader::new(declaration)),
        });
        self.headers_of_mut(kind).push(section);
        section
    }

    pub fn add_test_case(&mut self, name: &str) -> usize {
        self.add_element(ElementKind::TestCase, name)
    }

    pub fn add_task(&mut self, name: &str) -> usize {
        self.add_element(ElementKind::Task, name)
    }

    pub fn add_keyword(&mut self, name: &str) -> usize {
        self.add_element(ElementKind::Keyword, name)
    }

    /// Appends a new element and returns its element index.
    pub fn add_element(&mut self, kind: ElementKind, name: &str) -> usize {
        let section = self.ensure_table(kind.table());
        let token = self.alloc(RobotToken::created(name, RobotTokenType::ElementName(kind)));
        let table = self.code_table_mut(kind);
        table.push_element(section, token);
        table.element_count() - 1
    }

    pub fn remove_element(&mut self, kind: ElementKind, index: usize) -> Result<(), UpdateError> {
        let entry = self.element_entry(kind, index)?;
        let removed = self.code_table_mut(kind).remove_entry(entry);
        self.mark_removed(&removed);
        Ok(())
    }

    /// Swaps the element with its predecessor. Returns false when it is already first.
    pub fn move_element_up(&mut self, kind: ElementKind, index: usize) -> Result<bool, UpdateError> {
        let entry = self.element_entry(kind, index)?;
        if index == 0 {
            return Ok(false);
        }
        let previous = self.element_entry(kind, index - 1)?;
        self.code_table_mut(kind).swap_items(previous, entry);
        Ok(true)
    }

    /// Swaps the element with its successor. Returns false when it is already last.
    pub fn move_element_down(&mut self, kind: ElementKind, index: usize) -> Result<bool, UpdateError> {
        let entry = self.element_entry(kind, index)?;
        let Some(next) = self.code_table(kind).entry_of_element(index + 1) else {
            return Ok(false);
        };
        self.code_table_mut(kind).swap_items(entry, next);
        Ok(true)
    }

    /// Appends an executable row made of `cells` (action first) and returns its body index.
    pub fn add_row(&mut self, kind: ElementKind, element: usize, cells: &[&str]) -> Result<usize, UpdateError> {
        let entry = self.element_entry(kind, element)?;
        let at = self.code_table(kind).body_len(entry).unwrap_or_default();
        self.insert_row_at_entry(kind, entry, at, cells)
    }

    /// Inserts an executable row before body index `at` (clamped to the body length).
    pub fn insert_row(
        &mut self,
        kind: ElementKind,
        element: usize,
        at: usize,
        cells: &[&str],
    ) -> Result<usize, UpdateError> {
        let entry = self.element_entry(kind, element)?;
        self.insert_row_at_entry(kind, entry, at, cells)
    }

    /// Removes any body item (row, local setting or empty line).
    pub fn remove_body_item(&mut self, kind: ElementKind, element: usize, body: usize) -> Result<(), UpdateError> {
        let entry = self.element_entry(kind, element)?;
        let removed = self
            .code_table_mut(kind)
            .remove_body_item(entry, body)
            .ok_or(UpdateError::NoSuchRow { index: body })?;
        self.mark_removed(&removed);
        self.redescribe(kind, entry);
        Ok(())
    }

    pub fn add_argument(&mut self, kind: ElementKind, element: usize, body: usize, text: &str) -> Result<TokenId, UpdateError> {
        let entry = self.element_entry(kind, element)?;
        if !self.code_table(kind).is_row(entry, body) {
            return Err(UpdateError::NoSuchRow { index: body });
        }
        let token = self.alloc(RobotToken::created(text, RobotTokenType::ActionArgument(kind)));
        let (table, arena) = self.code_table_and_tokens(kind);
        if let Some(mut parts) = table.row_parts_mut(entry, body) {
            if parts.action.is_none() {
                arena.get_mut(token).set_primary_type(RobotTokenType::ActionName(kind));
            }
            parts.push_cell(token);
        }
        self.redescribe(kind, entry);
        Ok(token)
    }

    /// Appends `[setting]    values...` to an element body and returns its body index.
    pub fn add_local_setting(
        &mut self,
        kind: ElementKind,
        element: usize,
        setting: LocalSettingKind,
        values: &[&str],
    ) -> Result<usize, UpdateError> {
        let entry = self.element_entry(kind, element)?;
        if setting == LocalSettingKind::Unknown || !self.code_table(kind).supports(setting) {
            return Err(UpdateError::UnsupportedSetting { kind, setting });
        }
        let declaration = self.alloc(RobotToken::created(
            setting.representation(),
            RobotTokenType::LocalSettingDeclaration(setting),
        ));
        let mut row = LocalSetting::new(setting, declaration);
        for (index, value) in values.iter().enumerate() {
            let token_type = RobotTokenType::LocalSettingValue(setting, setting.value_role(index));
            row.values.push(self.alloc(RobotToken::created(*value, token_type)));
        }
        self.code_table_mut(kind)
            .push_body_setting(entry, row)
            .ok_or(UpdateError::NoSuchElement { kind, index: element })
    }

    /// Appends a settings-table setting and returns its element index.
    pub fn add_setting(&mut self, kind: SettingKind, values: &[&str]) -> Result<usize, UpdateError> {
        if kind == SettingKind::Unknown {
            return Err(UpdateError::UnknownSetting);
        }
        let section = self.ensure_table(TableKind::Settings);
        let declaration = self.alloc(RobotToken::created(
            kind.representation(),
            RobotTokenType::SettingDeclaration(kind),
        ));
        let mut setting = Setting::new(kind, declaration);
        let mut roles: Vec<ValueRole> = Vec::new();
        for (index, value) in values.iter().enumerate() {
            let role = kind.value_role(index, &roles, value);
            roles.push(role);
            setting
                .values
                .push(self.alloc(RobotToken::created(*value, RobotTokenType::SettingValue(kind, role))));
        }
        self.settings.push(section, TableItem::Element(setting));
        Ok(self.settings.len() - 1)
    }

    /// Appends a variable declaration such as `${name}` and returns its element index.
    pub fn add_variable(&mut self, declaration: &str, values: &[&str]) -> Result<usize, UpdateError> {
        let recognizers = RecognizerSet::for_version(self.version);
        let kind = match recognizers.variable(declaration) {
            VariableKind::Unknown => return Err(UpdateError::InvalidVariable(declaration.to_string())),
            VariableKind::Scalar if values.len() > 1 => VariableKind::ScalarAsList,
            kind => kind,
        };
        let section = self.ensure_table(TableKind::Variables);
        let token = self.alloc(RobotToken::created(declaration, RobotTokenType::VariableDeclaration(kind)));
        let mut variable = Variable::new(kind, token);
        for value in values {
            variable
                .values
                .push(self.alloc(RobotToken::created(*value, RobotTokenType::VariableValue)));
        }
        self.variables.push(section, TableItem::Element(variable));
        Ok(self.variables.len() - 1)
    }

    pub fn remove_setting(&mut self, index: usize) -> Result<(), UpdateError> {
        let entry = self
            .settings
            .entry_of_element(index)
            .ok_or(UpdateError::NoSuchEntry { table: TableKind::Settings, index })?;
        let removed = self.settings.entries.remove(entry);
        if let TableItem::Element(setting) = removed.item {
            self.mark_removed(&setting.tokens());
        }
        Ok(())
    }

    pub fn remove_variable(&mut self, index: usize) -> Result<(), UpdateError> {
        let entry = self
            .variables
            .entry_of_element(index)
            .ok_or(UpdateError::NoSuchEntry { table: TableKind::Variables, index })?;
        let removed = self.variables.entries.remove(entry);
        if let TableItem::Element(variable) = removed.item {
            self.mark_removed(&variable.tokens());
        }
        Ok(())
    }

    /// Edits a token in place. The dumper writes the new text instead of the raw one.
    pub fn set_token_text(&mut self, id: TokenId, text: &str) {
        self.tokens.get_mut(id).set_text(text);
    }

    /// Forces every line terminator to `eol` when dumping. `None` restores the original ones.
    pub fn set_eol_override(&mut self, eol: Option<EndOfLine>) {
        self.eol_override = eol.filter(|eol| !eol.is_none());
    }

    fn element_entry(&self, kind: ElementKind, index: usize) -> Result<usize, UpdateError> {
        self.code_table(kind)
            .entry_of_element(index)
            .ok_or(UpdateError::NoSuchElement { kind, index })
    }

    fn insert_row_at_entry(&mut self, kind: ElementKind, entry: usize, at: usize, cells: &[&str]) -> Result<usize, UpdateError> {
        let tokens: Vec<TokenId> = cells
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let token_type = if i == 0 {
                    RobotTokenType::ActionName(kind)
                } else {
                    RobotTokenType::ActionArgument(kind)
                };
                self.alloc(RobotToken::created(*text, token_type))
            })
            .collect();
        let table = self.code_table_mut(kind);
        let body = table
            .insert_body_row(entry, at, None)
            .ok_or(UpdateError::NoSuchRow { index: at })?;
        if let Some(mut parts) = table.row_parts_mut(entry, body) {
            for token in tokens {
                parts.push_cell(token);
            }
        }
        self.redescribe(kind, entry);
        Ok(body)
    }

    fn redescribe(&mut self, kind: ElementKind, entry: usize) {
        let recognizers = RecognizerSet::for_version(self.version);
        let (table, arena) = self.code_table_and_tokens(kind);
        table.describe_entry(entry, arena, &recognizers);
    }

    fn mark_removed(&mut self, tokens: &[TokenId]) {
        for id in tokens {
            self.tokens.get_mut(*id).mark_removed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::model::RowKind;
    use crate::robot::reading::FileFormat;
    use crate::robot::version::RobotVersion;

    fn empty() -> RobotFile {
        RobotFile::new(RobotVersion::LATEST, FileFormat::Robot)
    }

    #[test]
    fn adding_a_keyword_generates_the_table() {
        let mut file = empty();
        assert!(!file.keywords().is_present());
        let index = file.add_keyword("My Keyword");
        assert_eq!(index, 0);
        assert!(file.keywords().is_present());
        let section = file.keywords().headers()[0];
        let header = file.section(section).header().unwrap();
        assert_eq!(file.text(header.declaration()), "*** Keywords ***");
    }

    #[test]
    fn rows_get_descriptors() {
        let mut file = empty();
        file.add_test_case("T");
        file.add_row(ElementKind::TestCase, 0, &["${x}=", "Get Value", "a"]).unwrap();
        let test = file.test_cases().element(0).unwrap();
        let row = test.rows().next().unwrap();
        let descriptor = row.descriptor();
        assert_eq!(descriptor.kind, RowKind::Simple);
        assert_eq!(descriptor.assignments.len(), 1);
        assert_eq!(file.text(descriptor.keyword_action.unwrap()), "Get Value");
        assert_eq!(descriptor.keyword_arguments.len(), 1);
    }

    #[test]
    fn keywords_reject_test_only_settings() {
        let mut file = empty();
        file.add_keyword("kw");
        let err = file
            .add_local_setting(ElementKind::Keyword, 0, LocalSettingKind::Setup, &["Prepare"])
            .unwrap_err();
        assert_eq!(err.to_string(), "[Setup] is not allowed in a keyword");
        assert!(file
            .add_local_setting(ElementKind::Keyword, 0, LocalSettingKind::Arguments, &["${a}"])
            .is_ok());
    }

    #[test]
    fn moving_elements_swaps_neighbours() {
        let mut file = empty();
        file.add_test_case("first");
        file.add_test_case("second");
        assert!(file.move_element_down(ElementKind::TestCase, 0).unwrap());
        let names: Vec<_> = file
            .test_cases()
            .elements()
            .map(|t| file.text(t.name()).to_string())
            .collect();
        assert_eq!(names, ["second", "first"]);
        assert!(!file.move_element_up(ElementKind::TestCase, 0).unwrap());
        assert!(file.move_element_up(ElementKind::TestCase, 5).is_err());
    }

    #[test]
    fn removal_marks_tokens() {
        let mut file = empty();
        file.add_keyword("kw");
        file.add_row(ElementKind::Keyword, 0, &["Log", "x"]).unwrap();
        let tokens = file.keywords().element(0).unwrap().tokens();
        file.remove_element(ElementKind::Keyword, 0).unwrap();
        assert!(file.keywords().is_empty());
        assert!(tokens.iter().all(|id| file.token(*id).is_removed()));
    }

    #[test]
    fn settings_and_variables_get_roles_and_kinds() {
        let mut file = empty();
        file.add_setting(SettingKind::Library, &["Collections", "WITH NAME", "C"]).unwrap();
        let setting = file.settings().element(0).unwrap();
        assert_eq!(setting.name(file.tokens()), Some("Collections"));
        assert_eq!(file.text(setting.declaration()), "Library");

        file.add_variable("${list}", &["a", "b"]).unwrap();
        assert_eq!(
            file.variables().element(0).unwrap().kind(),
            VariableKind::ScalarAsList
        );
        assert!(matches!(
            file.add_variable("%{HOME}", &[]),
            Err(UpdateError::InvalidVariable(_))
        ));
    }
}
