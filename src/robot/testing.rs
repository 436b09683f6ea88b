//! Testing utilities
//!
//! # Guidelines
//!
//! Robot Framework data has many small syntax details (two-space separators, pipe cells,
//! `...` continuations, escaped spaces) that are easy to get wrong in an ad-hoc string.
//! Tests that need a realistic file should take it from [RobotSources], whose samples are
//! known to parse without issues and to round-trip byte for byte.
//!
//! For dumper tests use [assert_round_trip] or [assert_text_eq]: both print a per-line diff
//! that shows terminators, which is what usually differs.
//!
//! Small inline sources remain fine for focused unit tests of a single construct.

use crate::robot::dumping::{dump_with, DumpOptions};
use crate::robot::parsing::{parse_str, ParseOptions, ParseOutput};

/// Curated sample files.
pub struct RobotSources;

const SAMPLES: &[(&str, &str)] = &[
    (
        "settings.robot",
        "*** Settings ***\n\
         Documentation    Suite under test\n\
         Library    Collections\n\
         Library    OperatingSystem    WITH NAME    OS\n\
         Resource    common.resource\n\
         Force Tags    smoke    fast\n\
         ...    slow\n",
    ),
    (
        "variables.robot",
        "*** Variables ***\n\
         ${HOST}    localhost\n\
         @{USERS}    alice    bob\n\
         &{CONF}    a=1    b=2\n\
         ${PORT}=    8080\n",
    ),
    (
        "keywords.robot",
        "*** Keywords ***\n\
         kw\n  [Arguments]    ${a}    ${b}\n  Log Many    ${a}    ${b}\n\
         \n\
         User ${name} logs in\n    [Documentation]    Embedded argument\n    Log    ${name}\n",
    ),
    (
        "tests.robot",
        "*** Test Cases ***\n\
         First\n    [Tags]    smoke\n    ${x}=    Set Variable    1    # assign\n    Should Be Equal    ${x}    1\n\
         Second\n    FOR    ${i}    IN RANGE    3\n        Log    ${i}\n    END\n",
    ),
    (
        "pipes.robot",
        "| *** Test Cases *** |\n\
         | Pipes | Log | one |\n\
         |       | Log | two |\n",
    ),
    (
        "mixed.robot",
        "Free text before the first table\n\
         *** Settings ***\n\
         Library    String    # comment\n\
         *** Comments ***\n\
         anything goes here\n\
         *** Test Cases ***\n\
         T\n    No Operation\n",
    ),
    ("crlf.robot", "*** Test Cases ***\r\nT\r\n    Log    x\r\n"),
    ("unterminated.robot", "*** Keywords ***\nK\n    No Operation"),
];

impl RobotSources {
    pub fn names() -> impl Iterator<Item = &'static str> {
        SAMPLES.iter().map(|(name, _)| *name)
    }

    pub fn get(name: &str) -> Option<&'static str> {
        SAMPLES.iter().find(|(n, _)| *n == name).map(|(_, text)| *text)
    }

    pub fn all() -> impl Iterator<Item = (&'static str, &'static str)> {
        SAMPLES.iter().copied()
    }
}

/// Parses `text`, dumps it unchanged and checks the output is identical.
pub fn assert_round_trip(text: &str, options: &ParseOptions) -> ParseOutput {
    let output = parse_str(text, options);
    let dumped = dump_with(&output.file, &DumpOptions::default());
    assert_text_eq(text, &dumped);
    output
}

/// Assert that two strings are equal, with a line-by-line diff that keeps terminators.
pub fn assert_text_eq(expected: &str, actual: &str) {
    if let Some(report) = diff_text(expected, actual) {
        panic!("\n\nText comparison failed:\n{report}\n\nExpected:\n{expected:?}\n\nActual:\n{actual:?}\n");
    }
}

/// `None` when equal, otherwise the differing lines.
pub fn diff_text(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }
    let expected_lines: Vec<&str> = expected.split_inclusive('\n').collect();
    let actual_lines: Vec<&str> = actual.split_inclusive('\n').collect();
    let mut report = Vec::new();
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        match (expected_lines.get(i), actual_lines.get(i)) {
            (Some(exp), Some(act)) if exp == act => {}
            (Some(exp), Some(act)) => {
                report.push(format!("Line {}: MISMATCH", i + 1));
                report.push(format!("  Expected: {exp:?}"));
                report.push(format!("  Actual:   {act:?}"));
            }
            (Some(exp), None) => report.push(format!("Line {}: MISSING {exp:?}", i + 1)),
            (None, Some(act)) => report.push(format!("Line {}: EXTRA {act:?}", i + 1)),
            (None, None) => {}
        }
    }
    Some(report.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sample_parses_cleanly_and_round_trips() {
        for (name, text) in RobotSources::all() {
            let output = assert_round_trip(text, &ParseOptions::default());
            assert!(output.is_passed(), "{name}: {:?}", output.issues);
        }
    }

    #[test]
    fn diff_reports_terminator_changes() {
        let report = diff_text("a\r\nb\n", "a\nb\n").unwrap();
        assert!(report.contains("Line 1: MISMATCH"));
        assert!(!report.contains("Line 2"));
        assert!(diff_text("same", "same").is_none());
    }

    #[test]
    fn lookup_by_name() {
        assert!(RobotSources::get("pipes.robot").is_some());
        assert!(RobotSources::get("missing.robot").is_none());
        assert_eq!(RobotSources::names().count(), RobotSources::all().count());
    }
}
