//! Resolving keyword usages against keywords defined in parsed files

use robot_data::robot::keywords::{candidate_names, find_keywords, KeywordDefinition, KeywordSearcher};
use robot_data::robot::parsing::{parse_str, ParseOptions};
use rstest::rstest;

fn definitions() -> Vec<KeywordDefinition> {
    let resource = parse_str(
        "*** Keywords ***\nOpen Login Page\n    No Operation\nInput ${field:\\w+} as ${value}\n    Log    ${value}\n",
        &ParseOptions::default(),
    );
    let suite = parse_str(
        "*** Keywords ***\nOpen Login Page\n    Log    suite copy\nSubmit_Credentials\n    No Operation\n",
        &ParseOptions::default(),
    );
    let mut known = KeywordDefinition::collect(&resource.file, "login");
    known.extend(KeywordDefinition::collect(&suite.file, "suite"));
    known.push(KeywordDefinition::new("Log", "BuiltIn"));
    known
}

#[rstest]
#[case("log", "BuiltIn", "Log")]
#[case("submit credentials", "suite", "Submit_Credentials")]
#[case("Then Submit Credentials", "suite", "Submit_Credentials")]
#[case("login.Open Login Page", "login", "Open Login Page")]
#[case("Suite.open_login_page", "suite", "Open Login Page")]
#[case("And input user as alice", "login", "Input ${field:\\w+} as ${value}")]
#[case("BuiltIn.Log", "BuiltIn", "Log")]
fn unique_matches(#[case] usage: &str, #[case] source: &str, #[case] name: &str) {
    let known = definitions();
    let found = find_keywords(&known, usage);
    let keyword = found.unique().unwrap_or_else(|| panic!("{usage}: {:?}", found.by_source));
    assert_eq!((keyword.source.as_str(), keyword.name.as_str()), (source, name));
}

#[test]
fn unqualified_duplicate_is_ambiguous() {
    let known = definitions();
    let found = find_keywords(&known, "Open Login Page");
    assert!(!found.fast_path);
    assert_eq!(found.len(), 2);
    assert!(found.unique().is_none());
    let lines: Vec<_> = found.all().map(|k| (k.source.as_str(), k.line)).collect();
    assert_eq!(lines, [("login", Some(2)), ("suite", Some(2))]);
}

#[test]
fn embedded_pattern_rejects_non_matching_arguments() {
    let known = definitions();
    assert!(find_keywords(&known, "Input two words as alice").is_empty());
}

#[test]
fn searcher_is_shared_across_threads() {
    let known = definitions();
    let searcher = KeywordSearcher::new(&known);
    let searcher = &searcher;
    std::thread::scope(|scope| {
        let handles: Vec<_> = ["log", "login.Open Login Page", "Given Log"]
            .into_iter()
            .map(|usage| scope.spawn(move || searcher.find(usage).len()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    });
}

#[test]
fn candidates_for_nested_prefixes() {
    insta::assert_debug_snapshot!(candidate_names("When but.And x.y"), @r#"
    [
        "When but.And x.y",
        "but.And x.y",
        "And x.y",
        "x.y",
        "y",
    ]
    "#);
}
