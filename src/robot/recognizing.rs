//! Token type recognizers
//!
//!     Each recognizer is a row in a static table: a compiled pattern, the type it produces,
//!     and a version predicate. A [RecognizerSet] is the subset that applies to one declared
//!     version; lookups walk a group in priority order (most specific first) and the first
//!     match wins.
//!
//!     Recognizers only look at cell text. Positional rules (a setting must be the first cell
//!     of its row, a local setting the first cell of an indented row) are enforced by the
//!     mappers in [parsing](super::parsing), which know the line context.

use once_cell::sync::Lazy;
use regex::Regex;

use super::token::{LocalSettingKind, RobotTokenType, SettingKind, TableKind, VariableKind};
use super::version::RobotVersion;

/// Which table a recognizer group serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizerGroup {
    TableHeader,
    Setting,
    LocalSetting,
    Variable,
    ForLoop,
}

/// Version window in which a recognizer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    Always,
    Since(u16, u16),
    Before(u16, u16),
}

impl Applicability {
    pub fn applies(self, version: RobotVersion) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::Since(major, minor) => version.is_at_least(major, minor),
            Applicability::Before(major, minor) => version.is_older_than(major, minor),
        }
    }
}

#[derive(Debug)]
pub struct Recognizer {
    pub group: RecognizerGroup,
    pub pattern: Regex,
    pub produces: RobotTokenType,
    pub applicability: Applicability,
    /// Version from which a match is reported as deprecated.
    pub deprecated_since: Option<(u16, u16)>,
}

/// Outcome of a successful recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognition {
    pub token_type: RobotTokenType,
    pub deprecated: bool,
}

struct Row(
    RecognizerGroup,
    String,
    RobotTokenType,
    Applicability,
    Option<(u16, u16)>,
);

fn header(words: &str) -> String {
    format!(r"(?i)^\*+\s*{words}\s*\**$")
}

fn setting(words: &str) -> String {
    format!(r"(?i)^{words}\s*:?$")
}

fn local(words: &str) -> String {
    format!(r"(?i)^\[\s*{words}\s*\]$")
}

static RECOGNIZERS: Lazy<Vec<Recognizer>> = Lazy::new(|| {
    use Applicability::*;
    use RecognizerGroup as G;
    use RobotTokenType as T;

    let headers = [
        (r"settings?", T::TableHeader(TableKind::Settings), Always),
        (r"variables?", T::TableHeader(TableKind::Variables), Always),
        (r"test\s*cases?", T::TableHeader(TableKind::TestCases), Always),
        (r"tasks?", T::TableHeader(TableKind::Tasks), Since(3, 1)),
        (r"user\s*keywords?", T::TableHeader(TableKind::Keywords), Before(3, 1)),
        (r"keywords?", T::TableHeader(TableKind::Keywords), Always),
        (r"comments?", T::TableHeader(TableKind::Comments), Always),
    ]
    .map(|(words, produces, when)| Row(G::TableHeader, header(words), produces, when, None));

    let settings = [
        (r"library", SettingKind::Library, Always, None),
        (r"resource", SettingKind::Resource, Always, None),
        (r"variables", SettingKind::Variables, Always, None),
        (r"documentation", SettingKind::Documentation, Always, None),
        (r"document", SettingKind::Documentation, Always, Some((3, 0))),
        (r"metadata", SettingKind::Metadata, Always, None),
        (r"meta", SettingKind::Metadata, Always, Some((3, 0))),
        (r"suite\s*setup", SettingKind::SuiteSetup, Always, None),
        (r"suite\s*precondition", SettingKind::SuiteSetup, Always, Some((3, 0))),
        (r"suite\s*teardown", SettingKind::SuiteTeardown, Always, None),
        (r"suite\s*postcondition", SettingKind::SuiteTeardown, Always, Some((3, 0))),
        (r"test\s*setup", SettingKind::TestSetup, Always, None),
        (r"test\s*precondition", SettingKind::TestSetup, Always, Some((3, 0))),
        (r"test\s*teardown", SettingKind::TestTeardown, Always, None),
        (r"test\s*postcondition", SettingKind::TestTeardown, Always, Some((3, 0))),
        (r"test\s*template", SettingKind::TestTemplate, Always, None),
        (r"test\s*timeout", SettingKind::TestTimeout, Always, None),
        (r"task\s*setup", SettingKind::TaskSetup, Since(3, 1), None),
        (r"task\s*teardown", SettingKind::TaskTeardown, Since(3, 1), None),
        (r"task\s*template", SettingKind::TaskTemplate, Since(3, 1), None),
        (r"task\s*timeout", SettingKind::TaskTimeout, Since(3, 1), None),
        (r"force\s*tags", SettingKind::ForceTags, Always, None),
        (r"default\s*tags", SettingKind::DefaultTags, Always, None),
    ]
    .map(|(words, kind, when, deprecated)| {
        Row(G::Setting, setting(words), T::SettingDeclaration(kind), when, deprecated)
    });

    let locals = [
        (r"documentation", LocalSettingKind::Documentation, None),
        (r"tags", LocalSettingKind::Tags, None),
        (r"setup", LocalSettingKind::Setup, None),
        (r"precondition", LocalSettingKind::Setup, Some((3, 0))),
        (r"teardown", LocalSettingKind::Teardown, None),
        (r"postcondition", LocalSettingKind::Teardown, Some((3, 0))),
        (r"template", LocalSettingKind::Template, None),
        (r"timeout", LocalSettingKind::Timeout, None),
        (r"arguments", LocalSettingKind::Arguments, None),
        (r"return", LocalSettingKind::Return, None),
        (r".*", LocalSettingKind::Unknown, None),
    ]
    .map(|(words, kind, deprecated)| {
        Row(G::LocalSetting, local(words), T::LocalSettingDeclaration(kind), Always, deprecated)
    });

    let variables = [
        Row(G::Variable, r"^\$\{.+\}\s?=?$".to_string(), T::VariableDeclaration(VariableKind::Scalar), Always, None),
        Row(G::Variable, r"^@\{.+\}\s?=?$".to_string(), T::VariableDeclaration(VariableKind::List), Always, None),
        Row(G::Variable, r"^&\{.+\}\s?=?$".to_string(), T::VariableDeclaration(VariableKind::Dictionary), Since(2, 9), None),
    ];

    let for_loop = [
        Row(G::ForLoop, r"(?i)^:\s*for$".to_string(), T::ForDeclaration, Always, None),
        Row(G::ForLoop, r"^FOR$".to_string(), T::ForDeclaration, Since(3, 1), None),
        Row(G::ForLoop, r"^END$".to_string(), T::ForEnd, Since(3, 1), None),
        Row(G::ForLoop, r"(?i)^in(\s+(range|enumerate|zip))?$".to_string(), T::ForIn, Always, None),
        Row(G::ForLoop, r"^\\$".to_string(), T::ForContinue, Always, None),
    ];

    headers
        .into_iter()
        .chain(settings)
        .chain(locals)
        .chain(variables)
        .chain(for_loop)
        .map(|Row(group, pattern, produces, applicability, deprecated_since)| Recognizer {
            group,
            pattern: Regex::new(&pattern).unwrap(),
            produces,
            applicability,
            deprecated_since,
        })
        .collect()
});

/// Recognizers applicable to one declared version.
#[derive(Debug, Clone)]
pub struct RecognizerSet {
    version: RobotVersion,
    active: Vec<&'static Recognizer>,
}

impl RecognizerSet {
    pub fn for_version(version: RobotVersion) -> Self {
        let active = RECOGNIZERS
            .iter()
            .filter(|r| r.applicability.applies(version))
            .collect();
        Self { version, active }
    }

    pub fn version(&self) -> RobotVersion {
        self.version
    }

    /// First recognizer of `group` matching `text`.
    pub fn recognize(&self, group: RecognizerGroup, text: &str) -> Option<Recognition> {
        self.active
            .iter()
            .filter(|r| r.group == group)
            .find(|r| r.pattern.is_match(text))
            .map(|r| Recognition {
                token_type: r.produces,
                deprecated: r
                    .deprecated_since
                    .map_or(false, |(major, minor)| self.version.is_at_least(major, minor)),
            })
    }

    pub fn table_header(&self, text: &str) -> Option<TableKind> {
        match self.recognize(RecognizerGroup::TableHeader, text)?.token_type {
            RobotTokenType::TableHeader(kind) => Some(kind),
            _ => None,
        }
    }

    /// Setting kind of a settings-table declaration cell, `Unknown` when nothing matches.
    pub fn setting(&self, text: &str) -> (SettingKind, bool) {
        match self.recognize(RecognizerGroup::Setting, text) {
            Some(Recognition {
                token_type: RobotTokenType::SettingDeclaration(kind),
                deprecated,
            }) => (kind, deprecated),
            _ => (SettingKind::Unknown, false),
        }
    }

    /// Local setting kind of a `[...]` cell, `None` when the cell is not bracketed.
    pub fn local_setting(&self, text: &str) -> Option<(LocalSettingKind, bool)> {
        match self.recognize(RecognizerGroup::LocalSetting, text)? {
            Recognition {
                token_type: RobotTokenType::LocalSettingDeclaration(kind),
                deprecated,
            } => Some((kind, deprecated)),
            _ => None,
        }
    }

    pub fn variable(&self, text: &str) -> VariableKind {
        match self.recognize(RecognizerGroup::Variable, text) {
            Some(Recognition {
                token_type: RobotTokenType::VariableDeclaration(kind),
                ..
            }) => kind,
            _ => VariableKind::Unknown,
        }
    }

    pub fn for_loop_marker(&self, text: &str) -> Option<RobotTokenType> {
        self.recognize(RecognizerGroup::ForLoop, text)
            .map(|r| r.token_type)
    }
}

/// Any first cell starting with `*` opens a table, recognized or not.
pub fn looks_like_table_header(text: &str) -> bool {
    text.starts_with('*')
}

pub fn is_line_continuation(text: &str) -> bool {
    text == "..."
}

pub fn is_hash_comment(text: &str) -> bool {
    text.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(major: u16, minor: u16) -> RecognizerSet {
        RecognizerSet::for_version(RobotVersion::new(major, minor))
    }

    #[test]
    fn header_spellings_share_one_type() {
        let recognizers = set(3, 1);
        for text in ["*** Test Cases ***", "*Test Case*", "***Test Cases", "*** test cases ***", "* TestCases *"] {
            assert_eq!(recognizers.table_header(text), Some(TableKind::TestCases), "{text}");
        }
        assert_eq!(recognizers.table_header("Test Cases"), None);
    }

    #[test]
    fn tasks_header_needs_version_3_1() {
        assert_eq!(set(3, 1).table_header("***  Tasks ***"), Some(TableKind::Tasks));
        assert_eq!(set(3, 1).table_header("*Task"), Some(TableKind::Tasks));
        assert_eq!(set(3, 0).table_header("*** Tasks ***"), None);
    }

    #[test]
    fn user_keywords_header_only_before_3_1() {
        assert_eq!(set(3, 0).table_header("*** User Keywords ***"), Some(TableKind::Keywords));
        assert_eq!(set(3, 1).table_header("*** User Keywords ***"), None);
        assert_eq!(set(3, 1).table_header("*** Keywords ***"), Some(TableKind::Keywords));
        assert_eq!(set(2, 9).table_header("*** Keywords ***"), Some(TableKind::Keywords));
    }

    #[test]
    fn settings_accept_colon_and_report_deprecation() {
        let recognizers = set(3, 0);
        assert_eq!(recognizers.setting("Library:"), (SettingKind::Library, false));
        assert_eq!(recognizers.setting("suite setup"), (SettingKind::SuiteSetup, false));
        assert_eq!(recognizers.setting("Suite Precondition"), (SettingKind::SuiteSetup, true));
        assert_eq!(set(2, 8).setting("Suite Precondition"), (SettingKind::SuiteSetup, false));
        assert_eq!(recognizers.setting("Libraries"), (SettingKind::Unknown, false));
        assert_eq!(recognizers.setting("Task Setup"), (SettingKind::Unknown, false));
        assert_eq!(set(3, 1).setting("Task Setup"), (SettingKind::TaskSetup, false));
    }

    #[test]
    fn local_settings_must_be_bracketed() {
        let recognizers = set(3, 1);
        assert_eq!(
            recognizers.local_setting("[Arguments]"),
            Some((LocalSettingKind::Arguments, false))
        );
        assert_eq!(
            recognizers.local_setting("[ documentation ]"),
            Some((LocalSettingKind::Documentation, false))
        );
        assert_eq!(
            recognizers.local_setting("[Bogus]"),
            Some((LocalSettingKind::Unknown, false))
        );
        assert_eq!(recognizers.local_setting("Arguments"), None);
    }

    #[test]
    fn variable_declarations_by_sigil() {
        assert_eq!(set(2, 9).variable("${x}"), VariableKind::Scalar);
        assert_eq!(set(2, 9).variable("@{list} ="), VariableKind::List);
        assert_eq!(set(2, 9).variable("&{d}="), VariableKind::Dictionary);
        assert_eq!(set(2, 8).variable("&{d}"), VariableKind::Unknown);
        assert_eq!(set(3, 1).variable("%{HOME}"), VariableKind::Unknown);
        assert_eq!(set(3, 1).variable("${}"), VariableKind::Unknown);
    }

    #[test]
    fn for_markers_by_version() {
        assert_eq!(set(3, 0).for_loop_marker(": FOR"), Some(RobotTokenType::ForDeclaration));
        assert_eq!(set(3, 0).for_loop_marker(":for"), Some(RobotTokenType::ForDeclaration));
        assert_eq!(set(3, 0).for_loop_marker("FOR"), None);
        assert_eq!(set(3, 1).for_loop_marker("FOR"), Some(RobotTokenType::ForDeclaration));
        assert_eq!(set(3, 1).for_loop_marker("IN RANGE"), Some(RobotTokenType::ForIn));
        assert_eq!(set(3, 1).for_loop_marker("\\"), Some(RobotTokenType::ForContinue));
    }

    #[test]
    fn line_markers() {
        assert!(looks_like_table_header("*Setting"));
        assert!(looks_like_table_header("*** Anything ***"));
        assert!(!looks_like_table_header("Log"));
        assert!(is_line_continuation("..."));
        assert!(!is_line_continuation("...."));
        assert!(is_hash_comment("#no space needed"));
        assert!(!is_hash_comment("Log    #"));
    }
}
