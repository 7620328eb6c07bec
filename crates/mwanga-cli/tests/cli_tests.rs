//! CLI integration tests

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn mwanga_cmd() -> Command {
    Command::cargo_bin("mwanga").unwrap()
}

fn source_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".mwa")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_help_lists_commands() {
    mwanga_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("repl"));
}

#[test]
fn test_run_prints_program_output() {
    let file = source_file("andika(1 + 2)");
    mwanga_cmd()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn test_run_whole_program() {
    let file = source_file(
        "fanya salamu = unda(jina) { \"Habari, \" + jina };\nandika(salamu(\"dunia\"))",
    );
    mwanga_cmd()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Habari, dunia"));
}

#[test]
fn test_run_reports_runtime_errors_on_stderr() {
    let file = source_file("haipo");
    mwanga_cmd()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Neno Halifahamiki: haipo"));
}

#[test]
fn test_run_reports_parse_errors_on_stderr() {
    let file = source_file("fanya = 1;");
    mwanga_cmd()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mstari 1"));
}

#[test]
fn test_run_missing_file_fails() {
    mwanga_cmd()
        .arg("run")
        .arg("haipo.mwa")
        .assert()
        .failure();
}
