//! Keyword names with embedded arguments
//!
//! `Select ${animal} from list` matches `Select cat from list`. The name is compiled into an
//! anchored, case-insensitive pattern: literal parts are escaped, each `${arg}` becomes a lazy
//! wildcard and `${arg:regex}` uses its own pattern.

use regex::Regex;

use crate::robot::variables::{extract, Fragment, VariableSigil};
use crate::robot::version::RobotVersion;

#[derive(Debug, Clone)]
pub struct EmbeddedKeywordName {
    name: String,
    arguments: Vec<String>,
    pattern: Regex,
}

impl EmbeddedKeywordName {
    /// Compiles `name`. `None` when it embeds no scalar argument or a custom pattern is invalid.
    pub fn parse(name: &str) -> Option<Self> {
        let extraction = extract(name, RobotVersion::LATEST);
        let mut body = String::new();
        let mut arguments = Vec::new();
        for fragment in &extraction.fragments {
            match fragment {
                Fragment::Variable(variable) if variable.sigil == VariableSigil::Scalar && !variable.has_index() => {
                    let (argument, custom) = match variable.name.split_once(':') {
                        Some((argument, custom)) => (argument, Some(custom)),
                        None => (variable.name.as_str(), None),
                    };
                    arguments.push(argument.to_string());
                    body.push_str(&format!("({})", custom.unwrap_or(".*?")));
                }
                other => body.push_str(&regex::escape(other.text())),
            }
        }
        if arguments.is_empty() {
            return None;
        }
        let pattern = Regex::new(&format!("(?i)^{body}$")).ok()?;
        Some(Self {
            name: name.to_string(),
            arguments,
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument names in order, custom patterns stripped.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn matches(&self, usage: &str) -> bool {
        self.pattern.is_match(usage)
    }
}

/// The name with custom argument patterns removed, `${a:\d+}` becoming `${a}`.
pub fn remove_regex(name: &str) -> String {
    extract(name, RobotVersion::LATEST).replace_with(|variable| {
        let (argument, _) = variable.name.split_once(':')?;
        Some(format!("{}{{{}}}", variable.sigil.as_char(), argument))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_not_embedded() {
        assert!(EmbeddedKeywordName::parse("Log Many").is_none());
        assert!(EmbeddedKeywordName::parse("Use @{list}").is_none());
    }

    #[test]
    fn matches_literal_parts_case_insensitively() {
        let name = EmbeddedKeywordName::parse("User ${name} logs in").unwrap();
        assert_eq!(name.arguments(), ["name"]);
        assert!(name.matches("user john logs IN"));
        assert!(!name.matches("Given user john logs in"));
        assert!(!name.matches("user john logs out"));
    }

    #[test]
    fn custom_patterns_restrict_arguments() {
        let name = EmbeddedKeywordName::parse(r"Wait ${n:\d+} seconds").unwrap();
        assert!(name.matches("wait 10 seconds"));
        assert!(!name.matches("wait ten seconds"));
        assert_eq!(remove_regex(name.name()), "Wait ${n} seconds");
    }

    #[test]
    fn literal_regex_characters_are_escaped() {
        let name = EmbeddedKeywordName::parse("Price is ${amount} (approx.)").unwrap();
        assert!(name.matches("price is 5 (approx.)"));
        assert!(!name.matches("price is 5 approx"));
    }
}
