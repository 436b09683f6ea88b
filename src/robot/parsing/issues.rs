//! Parse issues and file status

use std::fmt;

use serde::Serialize;

use crate::robot::token::FilePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A non-fatal problem found while parsing. `line` and `column` are both 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseIssue {
    pub fn new(severity: Severity, position: FilePosition, message: impl Into<String>) -> Self {
        Self {
            severity,
            line: position.line,
            column: position.column + 1,
            message: message.into(),
        }
    }

    pub fn warn(position: FilePosition, message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, position, message)
    }

    pub fn error(position: FilePosition, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, position, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}: {}", self.line, self.column, self.severity, self.message)
    }
}

/// Overall result of parsing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    /// FAILED as soon as one ERROR was recorded. Warnings never fail a file.
    pub fn of(issues: &[ParseIssue]) -> Self {
        if issues.iter().any(ParseIssue::is_error) {
            Status::Failed
        } else {
            Status::Passed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_reported_one_based() {
        let issue = ParseIssue::error(FilePosition::new(3, 4, 40), "Unrecognized setting 'Foo'");
        assert_eq!(issue.to_string(), "3:5: ERROR: Unrecognized setting 'Foo'");
    }

    #[test]
    fn only_errors_fail_a_file() {
        let warn = ParseIssue::warn(FilePosition::start(), "deprecated");
        assert_eq!(Status::of(&[warn.clone()]), Status::Passed);
        let error = ParseIssue::error(FilePosition::start(), "bad");
        assert_eq!(Status::of(&[warn, error]), Status::Failed);
        assert_eq!(Status::of(&[]), Status::Passed);
    }
}
