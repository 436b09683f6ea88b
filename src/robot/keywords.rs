//! Keyword name resolution
//!
//!     Maps a keyword usage (the action cell of a row) to the definitions it may refer to.
//!     Names compare "unified": case-folded, with whitespace and underscores removed, so
//!     `Log Many`, `log_many` and `LOGMANY` are the same keyword. Names embedding arguments
//!     (`Open ${page} page`) are matched by [pattern](embedded) instead.
//!
//!     Definitions come from anywhere that implements [KeywordEntity]; [KeywordDefinition] is
//!     the owned form collected from parsed files.

pub mod embedded;
pub mod search;

use serde::Serialize;

pub use embedded::{remove_regex, EmbeddedKeywordName};
pub use search::{candidate_names, find_keywords, KeywordMatches, KeywordSearcher};

use crate::robot::model::RobotFile;

/// Anything that defines a keyword.
pub trait KeywordEntity {
    fn name(&self) -> &str;

    /// Resource, library or alias the keyword is reachable through as a qualifier.
    fn source(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KeywordDefinition {
    pub name: String,
    pub source: String,
    /// 1-based line of the definition, when it comes from a parsed file.
    pub line: Option<usize>,
}

impl KeywordDefinition {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            line: None,
        }
    }

    /// User keywords of `file`, qualified by `source`.
    pub fn collect(file: &RobotFile, source: &str) -> Vec<Self> {
        file.keywords()
            .elements()
            .map(|keyword| {
                let token = file.token(keyword.name());
                Self {
                    name: token.text().to_string(),
                    source: source.to_string(),
                    line: token.position().map(|p| p.line),
                }
            })
            .collect()
    }
}

impl KeywordEntity for KeywordDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Case-folded name without whitespace and underscores.
pub fn unify(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::parsing::{parse_str, ParseOptions};

    #[test]
    fn unify_ignores_case_spaces_and_underscores() {
        assert_eq!(unify("Log Many"), "logmany");
        assert_eq!(unify("log_many"), "logmany");
        assert_eq!(unify(" LOG\tMANY "), "logmany");
    }

    #[test]
    fn collects_user_keywords_with_lines() {
        let output = parse_str(
            "*** Keywords ***\nFirst\n    No Operation\nSecond ${x}\n    Log    ${x}\n",
            &ParseOptions::default(),
        );
        let definitions = KeywordDefinition::collect(&output.file, "common");
        let names: Vec<_> = definitions.iter().map(|d| (d.name.as_str(), d.line)).collect();
        assert_eq!(names, [("First", Some(2)), ("Second ${x}", Some(4))]);
        assert!(definitions.iter().all(|d| d.source == "common"));
    }
}
