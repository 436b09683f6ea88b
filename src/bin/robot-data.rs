//! Command-line interface for robot-data
//! Parses, regenerates and inspects Robot Framework test data files.
//!
//! Usage:
//!   robot-data parse `<file>` [--robot-version `<v>`] [--format `<format>`]  - Print issues and the table outline
//!   robot-data dump `<file>` [--check] [--eol `<eol>`]                    - Regenerate the file from its model
//!   robot-data variables `<text>` [--robot-version `<v>`]                 - Show the variables used in a cell
//!   robot-data find-keyword `<usage>` `<file>`...                         - Resolve a keyword usage

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use robot_data::robot::config::{Loader, RobotDataConfig};
use robot_data::robot::keywords::KeywordSearcher;
use robot_data::robot::model::FileOutline;
use robot_data::robot::parsing::Status;
use robot_data::robot::project::Project;
use robot_data::robot::reading::EndOfLine;
use robot_data::robot::variables::{extract, Fragment};
use robot_data::robot::{dump_with, parse_path, DumpOptions, ParseOptions, RobotError, RobotVersion};

const FORMATS: [&str; 3] = ["summary", "json", "yaml"];

fn main() -> ExitCode {
    let version_arg = Arg::new("robot-version")
        .long("robot-version")
        .help("Robot Framework version the data is written for (e.g. '3.0')");
    let format_arg = Arg::new("format")
        .long("format")
        .short('f')
        .help("Output format")
        .value_parser(FORMATS)
        .default_value("summary");

    let matches = Command::new("robot-data")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for parsing and regenerating Robot Framework test data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a file and print its issues and outline")
                .arg(Arg::new("path").help("Path to the .robot, .txt or .tsv file").required(true).index(1))
                .arg(version_arg.clone())
                .arg(format_arg.clone()),
        )
        .subcommand(
            Command::new("dump")
                .about("Regenerate a file from its parsed model")
                .arg(Arg::new("path").help("Path to the .robot, .txt or .tsv file").required(true).index(1))
                .arg(version_arg.clone())
                .arg(
                    Arg::new("check")
                        .long("check")
                        .action(ArgAction::SetTrue)
                        .help("Only verify that the regenerated text equals the input"),
                )
                .arg(
                    Arg::new("eol")
                        .long("eol")
                        .value_parser(["lf", "crlf", "cr"])
                        .help("Force every line terminator"),
                ),
        )
        .subcommand(
            Command::new("variables")
                .about("Show the variables used in a cell value")
                .arg(Arg::new("text").help("Cell text, e.g. 'Hello ${name}'").required(true).index(1))
                .arg(version_arg)
                .arg(format_arg.clone()),
        )
        .subcommand(
            Command::new("find-keyword")
                .about("Resolve a keyword usage against the keywords defined in files")
                .arg(Arg::new("usage").help("Keyword as written in a row").required(true).index(1))
                .arg(
                    Arg::new("paths")
                        .help("Files defining keywords")
                        .required(true)
                        .num_args(1..)
                        .index(2),
                )
                .arg(format_arg.value_parser(["summary", "json"])),
        )
        .get_matches();

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded; errors abort it.
fn run(matches: &ArgMatches) -> Result<bool, RobotError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    let config = loader.build()?;
    init_logging(&config, matches.get_flag("verbose"));
    debug!(version = %config.parser.robot_version, "configuration loaded");

    match matches.subcommand() {
        Some(("parse", sub)) => {
            let path = PathBuf::from(required(sub, "path"));
            handle_parse_command(&path, parse_options(&config, sub)?, required(sub, "format"))
        }
        Some(("dump", sub)) => {
            let path = PathBuf::from(required(sub, "path"));
            let mut options = DumpOptions::from_config(&config);
            if let Some(eol) = sub.get_one::<String>("eol") {
                options.eol = EndOfLine::from_name(eol);
            }
            handle_dump_command(&path, parse_options(&config, sub)?, &options, sub.get_flag("check"))
        }
        Some(("variables", sub)) => {
            let version = parse_options(&config, sub)?.version;
            handle_variables_command(required(sub, "text"), version, required(sub, "format"))
        }
        Some(("find-keyword", sub)) => {
            let paths: Vec<PathBuf> = sub
                .get_many::<String>("paths")
                .into_iter()
                .flatten()
                .map(PathBuf::from)
                .collect();
            handle_find_keyword_command(&config, required(sub, "usage"), &paths, required(sub, "format"))
        }
        _ => unreachable!(),
    }
}

fn init_logging(config: &RobotDataConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Value of an argument that is required or has a default.
fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_else(|| unreachable!("clap enforces '{id}'"))
}

fn parse_options(config: &RobotDataConfig, matches: &ArgMatches) -> Result<ParseOptions, RobotError> {
    let options = ParseOptions::from_config(config);
    match matches.get_one::<String>("robot-version") {
        Some(version) => Ok(options.with_version(version.parse::<RobotVersion>()?)),
        None => Ok(options),
    }
}

fn print_serialized<T: Serialize>(value: &T, format: &str) -> Result<(), RobotError> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(value)?),
        _ => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Handle the parse command
fn handle_parse_command(
    path: &Path,
    options: ParseOptions,
    format: &str,
) -> Result<bool, RobotError> {
    let output = parse_path(path, &options)?;
    let outline = FileOutline::of(&output.file);

    if format != "summary" {
        #[derive(Serialize)]
        struct Report<'a> {
            status: Status,
            issues: &'a [robot_data::robot::ParseIssue],
            outline: &'a FileOutline,
        }
        let report = Report {
            status: output.status,
            issues: &output.issues,
            outline: &outline,
        };
        print_serialized(&report, format)?;
        return Ok(output.is_passed());
    }

    let status = match output.status {
        Status::Passed => "PASSED",
        Status::Failed => "FAILED",
    };
    println!("{}: {} (Robot Framework {})", path.display(), status, outline.version);
    for issue in &output.issues {
        println!("  {}", issue);
    }
    for table in &outline.tables {
        println!("{:?} ({} header{})", table.kind, table.headers, if table.headers == 1 { "" } else { "s" });
        for entry in &table.entries {
            let line = entry.line.map(|l| format!("{l}")).unwrap_or_else(|| "-".to_string());
            println!("  {:>4}  {}  {}", line, entry.name, entry.values.join(" | "));
            for row in &entry.body {
                println!("        {}", row);
            }
        }
    }
    Ok(output.is_passed())
}

/// Handle the dump command
fn handle_dump_command(
    path: &Path,
    options: ParseOptions,
    dump_options: &DumpOptions,
    check: bool,
) -> Result<bool, RobotError> {
    let output = parse_path(path, &options)?;
    let dumped = dump_with(&output.file, dump_options);
    if !check {
        print!("{}", dumped);
        return Ok(true);
    }
    let original = std::fs::read_to_string(path).map_err(|source| RobotError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let original = original.strip_prefix('\u{feff}').unwrap_or(&original);
    let dumped = dumped.strip_prefix('\u{feff}').unwrap_or(&dumped);
    match original
        .split_inclusive('\n')
        .zip(dumped.split_inclusive('\n'))
        .position(|(a, b)| a != b)
    {
        Some(index) => {
            println!("{}: differs at line {}", path.display(), index + 1);
            Ok(false)
        }
        None if original.len() != dumped.len() => {
            println!("{}: differs in length", path.display());
            Ok(false)
        }
        None => {
            println!("{}: round trip OK", path.display());
            Ok(true)
        }
    }
}

/// Handle the variables command
fn handle_variables_command(text: &str, version: RobotVersion, format: &str) -> Result<bool, RobotError> {
    let extraction = extract(text, version);
    if format != "summary" {
        print_serialized(&extraction, format)?;
        return Ok(extraction.is_valid());
    }
    for fragment in &extraction.fragments {
        match fragment {
            Fragment::Text(text) => println!("text      {:?}", text.text),
            Fragment::Variable(variable) => {
                println!("variable  {}  name={:?}", variable.text, variable.name);
                for nested in variable.nested_uses() {
                    println!("  nested  {}", nested.text);
                }
            }
        }
    }
    for error in &extraction.errors {
        println!("error     {}", error);
    }
    Ok(extraction.is_valid())
}

/// Handle the find-keyword command
fn handle_find_keyword_command(
    config: &RobotDataConfig,
    usage: &str,
    paths: &[PathBuf],
    format: &str,
) -> Result<bool, RobotError> {
    let project = Project::new(ParseOptions::from_config(config));
    for result in project.parse_all(paths) {
        if let Err(e) = result {
            eprintln!("Warning: {}", e);
        }
    }
    let definitions = project.keyword_definitions();
    let searcher = KeywordSearcher::new(&definitions);
    let matches = searcher.find(usage);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(!matches.is_empty());
    }
    if matches.is_empty() {
        println!("No keyword matches '{}'", usage);
        return Ok(false);
    }
    for (source, keywords) in &matches.by_source {
        for keyword in keywords {
            let line = keyword.line.map(|l| format!(":{l}")).unwrap_or_default();
            println!("{}{}  {}", source, line, keyword.name);
        }
    }
    if matches.unique().is_none() {
        println!("'{}' is ambiguous: {} matches", usage, matches.len());
    }
    Ok(true)
}
