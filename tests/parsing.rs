//! Parsing of whole files: tables, version gating, issues and FOR loop linkage

use robot_data::robot::model::{BodyItem, RowKind, TableItem};
use robot_data::robot::parsing::{parse_reader, parse_str, ParseOptions, Status};
use robot_data::robot::reading::FileFormat;
use robot_data::robot::token::{LocalSettingKind, RobotTokenType, SettingKind, TableKind, VariableKind};
use robot_data::robot::{dump, RobotError, RobotFile, RobotVersion};
use rstest::rstest;

fn parse_at(text: &str, major: u16, minor: u16) -> robot_data::robot::ParseOutput {
    parse_str(text, &ParseOptions::default().with_version(RobotVersion::new(major, minor)))
}

fn issue_lines(output: &robot_data::robot::ParseOutput) -> String {
    output
        .issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn keyword_scenario() {
    let text = "*** Keywords ***\nkw\n  [Arguments]    ${a}    ${b}\n  Log Many    ${a}    ${b}";
    let output = parse_str(text, &ParseOptions::default());
    assert_eq!(output.status, Status::Passed);

    let file = &output.file;
    assert_eq!(file.keywords().len(), 1);
    let keyword = file.keywords().element(0).unwrap();
    assert_eq!(keyword.name_text(file.tokens()), "kw");

    let arguments: Vec<_> = keyword.settings_of(LocalSettingKind::Arguments).collect();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].values().len(), 2);

    let rows: Vec<_> = keyword.executable_rows().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(file.text(rows[0].action().unwrap()), "Log Many");
    assert_eq!(rows[0].arguments().len(), 2);

    assert_eq!(dump(file), text);
}

#[rstest]
#[case("*** Settings ***", TableKind::Settings)]
#[case("*Setting", TableKind::Settings)]
#[case("***Variables***", TableKind::Variables)]
#[case("* Test Case *", TableKind::TestCases)]
#[case("*** testcases ***", TableKind::TestCases)]
#[case("*** Tasks ***", TableKind::Tasks)]
#[case("*** Keyword ***", TableKind::Keywords)]
#[case("*** Comments ***", TableKind::Comments)]
fn header_spellings(#[case] header: &str, #[case] kind: TableKind) {
    let output = parse_str(&format!("{header}\n"), &ParseOptions::default());
    assert!(output.is_passed(), "{:?}", output.issues);
    assert!(output.file.is_table_present(kind));
}

#[rstest]
#[case("*** Tasks ***", (3, 0), false)]
#[case("*** Tasks ***", (3, 1), true)]
#[case("*** User Keywords ***", (3, 0), true)]
#[case("*** User Keywords ***", (3, 1), false)]
#[case("*** Keywords ***", (2, 9), true)]
fn headers_are_version_gated(#[case] header: &str, #[case] version: (u16, u16), #[case] accepted: bool) {
    let output = parse_at(&format!("{header}\n"), version.0, version.1);
    assert_eq!(output.is_passed(), accepted, "{:?}", output.issues);
}

#[test]
fn unsupported_header_keeps_its_lines_as_trash() {
    let text = "*** Tasks ***\nT\n    No Operation\n";
    let output = parse_at(text, 3, 0);
    insta::assert_snapshot!(issue_lines(&output), @"1:1: ERROR: Table header '*** Tasks ***' is not supported in Robot Framework 3.0");
    assert!(!output.file.is_table_present(TableKind::Tasks));
    assert_eq!(output.file.trash().len(), 2);
    assert_eq!(dump(&output.file), text);
}

#[test]
fn setting_issues_are_collected_in_file_order() {
    let text = "*** Settings ***\nDocument    Old spelling\nLibrary\nTask Setup    Prepare\n";
    let output = parse_at(text, 3, 0);
    insta::assert_snapshot!(issue_lines(&output), @r"
    2:1: WARN: Setting 'Document' is deprecated, use 'Documentation'
    3:1: ERROR: Setting 'Library' requires a name
    4:1: ERROR: Setting 'Task Setup' is not supported in Robot Framework 3.0
    ");
    assert_eq!(output.status, Status::Failed);
    let kinds: Vec<_> = output.file.settings().elements().map(|s| s.kind()).collect();
    assert_eq!(kinds, [SettingKind::Documentation, SettingKind::Library, SettingKind::Unknown]);
}

#[test]
fn variable_declarations() {
    let text = "*** Variables ***\n${A}    1\n@{B}    1    2\n&{C}    k=v\n${D}=    x\n${E}    1    2\n%{F}    nope\n";
    let output = parse_str(text, &ParseOptions::default());
    let file = &output.file;
    let kinds: Vec<_> = file.variables().elements().map(|v| v.kind()).collect();
    assert_eq!(
        kinds,
        [
            VariableKind::Scalar,
            VariableKind::List,
            VariableKind::Dictionary,
            VariableKind::Scalar,
            VariableKind::ScalarAsList,
            VariableKind::Unknown,
        ]
    );
    assert_eq!(file.variables().element(3).unwrap().name(file.tokens()), "${D}");
    insta::assert_snapshot!(issue_lines(&output), @r"
    6:1: WARN: Scalar variable '${E}' with several values is deprecated, use a list variable
    7:1: ERROR: Invalid variable declaration '%{F}'
    ");
}

#[test]
fn new_style_for_loop_links_body_and_end() {
    let text = "*** Test Cases ***\nT\n    FOR    ${i}    IN RANGE    3\n        Log    ${i}\n    END\n";
    let output = parse_str(text, &ParseOptions::default());
    assert!(output.is_passed(), "{:?}", output.issues);
    let file = &output.file;
    let test = file.test_cases().element(0).unwrap();
    let rows: Vec<_> = test.rows().collect();
    let kinds: Vec<_> = rows.iter().map(|r| r.descriptor().kind).collect();
    assert_eq!(kinds, [RowKind::ForLoopDeclaration, RowKind::Simple, RowKind::ForLoopEnd]);
    assert!(rows.iter().all(|r| r.descriptor().for_loop_start == Some(0)));

    let parts = rows[0].descriptor().for_loop.as_ref().unwrap();
    assert_eq!(file.text(parts.in_token.unwrap()), "IN RANGE");
    assert_eq!(parts.values.len(), 1);
    assert!(file.token(rows[0].action().unwrap()).has_type(RobotTokenType::ForDeclaration));
}

#[test]
fn old_style_continuation_skips_comment_rows() {
    let text = "*** Keywords ***\nK\n    : FOR    ${x}    IN    a    b\n    # just a note\n    \\    Log    ${x}\n    \\    No Operation\n";
    let output = parse_at(text, 3, 0);
    assert!(output.is_passed(), "{:?}", output.issues);
    let keyword = output.file.keywords().element(0).unwrap();
    let starts: Vec<_> = keyword.rows().map(|r| r.descriptor().for_loop_start).collect();
    assert_eq!(starts, [Some(0), None, Some(0), Some(0)]);
}

#[test]
fn stray_loop_markers_warn() {
    let text = "*** Test Cases ***\nT\n    \\    Log    x\n    END\n";
    let output = parse_str(text, &ParseOptions::default());
    assert_eq!(output.status, Status::Passed);
    insta::assert_snapshot!(issue_lines(&output), @r"
    3:5: WARN: FOR loop continuation without FOR declaration
    4:5: WARN: END without opening FOR
    ");
    let test = output.file.test_cases().element(0).unwrap();
    assert!(test.rows().all(|r| r.descriptor().for_loop_start.is_none()));
}

#[test]
fn empty_lines_and_comments_stay_in_place() {
    let text = "*** Test Cases ***\n# table comment\nT\n    Log    a\n\n    # row comment\n    Log    b\n";
    let output = parse_str(text, &ParseOptions::default());
    let test = output.file.test_cases().element(0).unwrap();
    assert!(matches!(test.body()[1], BodyItem::Empty(_)));
    assert!(test.rows().nth(1).unwrap().is_comment_only());
    assert_eq!(dump(&output.file), text);
}

#[test]
fn comment_lines_in_declaration_tables() {
    let text = "*** Settings ***\n# about settings\nLibrary    X\n*** Variables ***\n# about variables\n${A}    1\n";
    let output = parse_str(text, &ParseOptions::default());
    assert!(output.is_passed(), "{:?}", output.issues);
    let file = &output.file;
    fn comment_text<'f, T>(file: &'f RobotFile, item: &TableItem<T>) -> Vec<&'f str> {
        match item {
            TableItem::Comment(line) => line.comments().iter().map(|id| file.text(*id)).collect(),
            _ => Vec::new(),
        }
    }
    assert_eq!(comment_text(file, file.settings().entries()[0].item()), ["# about settings"]);
    assert_eq!(comment_text(file, file.variables().entries()[0].item()), ["# about variables"]);
    assert_eq!((file.settings().len(), file.variables().len()), (1, 1));
    assert_eq!(dump(file), text);
}

#[test]
fn single_leading_space_starts_a_new_element() {
    let text = "*** Test Cases ***\nT\n    Log    a\n Second\n    Log    b\n";
    let output = parse_str(text, &ParseOptions::default());
    let file = &output.file;
    let names: Vec<_> = file.test_cases().elements().map(|t| t.name_text(file.tokens())).collect();
    assert_eq!(names, ["T", "Second"]);
    assert_eq!(file.test_cases().element(0).unwrap().rows().count(), 1);
    assert_eq!(dump(file), text);
}

#[test]
fn open_pipe_row_keeps_trailing_space_out_of_the_last_argument() {
    let text = "*** Test Cases ***\n| T | Log | a \n";
    let output = parse_str(text, &ParseOptions::default());
    let file = &output.file;
    let row = file.test_cases().element(0).unwrap().rows().next().unwrap();
    let arguments: Vec<_> = row.arguments().iter().map(|id| file.text(*id)).collect();
    assert_eq!(arguments, ["a"]);
    assert_eq!(dump(file), text);
}

#[test]
fn tsv_cells_are_split_on_every_tab() {
    let options = ParseOptions::default().with_format(FileFormat::Tsv);
    let output = parse_str("*Test Cases*\nT\tLog\t\tafter empty\n", &options);
    let file = &output.file;
    let row = file.test_cases().element(0).unwrap().rows().next().unwrap();
    let arguments: Vec<_> = row.arguments().iter().map(|id| file.text(*id)).collect();
    assert_eq!(arguments, ["", "after empty"]);
}

#[test]
fn invalid_utf8_is_a_read_error() {
    let bytes: &[u8] = b"*** Settings ***\nLibrary    \xff\n";
    let error = parse_reader(bytes, &ParseOptions::default()).unwrap_err();
    assert_eq!(error.line(), 2);
}

#[test]
fn unknown_extension_is_rejected() {
    let error = robot_data::robot::parse_path("suite.html", &ParseOptions::default()).unwrap_err();
    assert!(matches!(error, RobotError::UnsupportedFormat(_)));
}
