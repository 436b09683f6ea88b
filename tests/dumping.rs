//! Regenerating text from parsed and edited models

use proptest::prelude::*;
use robot_data::robot::dumping::{dump, dump_with, DumpOptions};
use robot_data::robot::model::FileOutline;
use robot_data::robot::parsing::{parse_str, ParseOptions};
use robot_data::robot::reading::{split_line, EndOfLine, FileFormat, LinePiece};
use robot_data::robot::testing::{assert_round_trip, assert_text_eq, RobotSources};
use robot_data::robot::token::{ElementKind, SettingKind};
use rstest::rstest;

#[rstest]
#[case("settings.robot")]
#[case("variables.robot")]
#[case("keywords.robot")]
#[case("tests.robot")]
#[case("pipes.robot")]
#[case("mixed.robot")]
#[case("crlf.robot")]
#[case("unterminated.robot")]
fn samples_round_trip(#[case] name: &str) {
    let text = RobotSources::get(name).unwrap();
    assert_round_trip(text, &ParseOptions::default());
}

#[test]
fn edits_land_in_their_tables() {
    let text = "*** Settings ***\nLibrary    Collections\n\n*** Test Cases ***\nFirst\n    Log    a\n";
    let mut file = parse_str(text, &ParseOptions::default()).file;
    file.add_setting(SettingKind::ForceTags, &["smoke"]).unwrap();
    let second = file.add_test_case("Second");
    file.add_row(ElementKind::TestCase, second, &["No Operation"]).unwrap();
    assert!(file.move_element_up(ElementKind::TestCase, second).unwrap());

    insta::assert_snapshot!(dump(&file), @r"
    *** Settings ***
    Library    Collections

    Force Tags    smoke
    *** Test Cases ***
    Second
        No Operation
    First
        Log    a
    ");
}

#[test]
fn missing_tables_are_generated_at_the_end() {
    let mut file = parse_str("*** Test Cases ***\nT\n    No Operation\n", &ParseOptions::default()).file;
    let keyword = file.add_keyword("Helper");
    file.add_row(ElementKind::Keyword, keyword, &["Log", "from helper"]).unwrap();
    assert_text_eq(
        "*** Test Cases ***\nT\n    No Operation\n*** Keywords ***\nHelper\n    Log    from helper\n",
        &dump(&file),
    );
}

#[test]
fn removed_elements_take_their_lines_with_them() {
    let text = "*** Keywords ***\nFirst\n    No Operation\nSecond\n    Log    x\n";
    let mut file = parse_str(text, &ParseOptions::default()).file;
    file.remove_element(ElementKind::Keyword, 0).unwrap();
    assert_text_eq("*** Keywords ***\nSecond\n    Log    x\n", &dump(&file));
}

#[test]
fn configured_separator_is_used_for_fresh_lines() {
    let mut file = parse_str("*** Variables ***\n", &ParseOptions::default()).file;
    file.add_variable("${x}", &["1", ""]).unwrap();
    let options = DumpOptions {
        separator: "  ".to_string(),
        ..DumpOptions::default()
    };
    assert_eq!(dump_with(&file, &options), "*** Variables ***\n${x}  1  ${EMPTY}\n");
}

#[test]
fn eol_override_stored_in_the_model() {
    let mut file = parse_str("*** Test Cases ***\nT\n    Log    x", &ParseOptions::default()).file;
    file.set_eol_override(Some(EndOfLine::CrLf));
    assert_eq!(dump(&file), "*** Test Cases ***\r\nT\r\n    Log    x");
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z][a-z0-9]{0,6}".prop_filter("loop markers change row kinds", |w| {
        !matches!(w.as_str(), "FOR" | "END" | "IN")
    })
}

fn separator() -> impl Strategy<Value = String> {
    prop_oneof![Just("    ".to_string()), Just("  ".to_string()), Just("\t".to_string()), Just("  \t ".to_string())]
}

fn cells(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word(), min..max)
}

/// A test case table with named elements and indented rows.
fn test_case_table() -> impl Strategy<Value = Vec<String>> {
    let row = (separator(), cells(1, 4), separator()).prop_map(|(indent, cells, sep)| format!("{indent}{}", cells.join(&sep)));
    let element = (word(), prop::collection::vec(row, 0..4)).prop_map(|(name, rows)| {
        let mut lines = vec![name];
        lines.extend(rows);
        lines
    });
    prop::collection::vec(element, 0..4).prop_map(|elements| {
        let mut lines = vec!["*** Test Cases ***".to_string()];
        lines.extend(elements.into_iter().flatten());
        lines
    })
}

fn settings_table() -> impl Strategy<Value = Vec<String>> {
    let name = prop_oneof![Just("Library"), Just("Resource"), Just("Documentation"), Just("Force Tags"), Just("Metadata")];
    let setting = (name, separator(), cells(1, 3)).prop_map(|(name, sep, values)| format!("{name}{sep}{}", values.join(&sep)));
    prop::collection::vec(setting, 0..4).prop_map(|settings| {
        let mut lines = vec!["*** Settings ***".to_string()];
        lines.extend(settings);
        lines
    })
}

fn robot_file() -> impl Strategy<Value = String> {
    (
        settings_table(),
        test_case_table(),
        prop::collection::vec(Just(String::new()), 0..2),
        prop_oneof![Just("\n"), Just("\r\n")],
        any::<bool>(),
    )
        .prop_map(|(settings, tests, blanks, eol, terminated)| {
            let mut lines = settings;
            lines.extend(blanks);
            lines.extend(tests);
            let mut text = lines.join(eol);
            if terminated {
                text.push_str(eol);
            }
            text
        })
}

proptest! {
    #[test]
    fn unedited_files_round_trip(text in robot_file()) {
        let output = parse_str(&text, &ParseOptions::default());
        let dumped = dump(&output.file);
        prop_assert_eq!(&dumped, &text);
        let reparsed = parse_str(&dumped, &ParseOptions::default());
        prop_assert_eq!(FileOutline::of(&reparsed.file), FileOutline::of(&output.file));
        prop_assert_eq!(reparsed.issues, output.issues);
    }

    #[test]
    fn split_pieces_cover_the_whole_line(line in "[a-z |\t]{0,30}", tsv in any::<bool>()) {
        let format = if tsv { FileFormat::Tsv } else { FileFormat::Robot };
        let split = split_line(&line, format);
        let rebuilt: String = split
            .pieces
            .iter()
            .map(|piece| match piece {
                LinePiece::Separator(s) => s.text.as_str(),
                LinePiece::Cell(c) => c.text.as_str(),
            })
            .collect();
        prop_assert_eq!(rebuilt, line);
        prop_assert!(split.cells().all(|c| c.text == c.text.trim_matches(' ') || tsv));
    }
}
