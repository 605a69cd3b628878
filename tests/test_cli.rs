//! Tests for the auryn binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn auryn() -> Command {
    Command::cargo_bin("auryn").unwrap()
}

#[test]
fn test_missing_script_argument_is_usage_error() {
    auryn()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("SCRIPT"));
}

#[test]
fn test_runs_script_and_echoes_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("hello.auryn");
    fs::write(&script, "run \"echo hello from auryn\" as $greeting\n").unwrap();

    auryn()
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from auryn"));
}

#[test]
fn test_dump_streams_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("dump.auryn");
    fs::write(&script, "run \"printf 'a\\nb\\n'\" as $letters\n").unwrap();

    auryn()
        .arg(&script)
        .arg("--dump-streams")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"letters\": ["))
        .stdout(predicate::str::contains("\"b\""));
}

#[test]
fn test_fatal_error_exits_nonzero_with_line() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("bad.auryn");
    fs::write(&script, "run \"echo x\"\n__LATE__ = \"1\"\n").unwrap();

    auryn()
        .arg(&script)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_statement_failures_are_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fails.auryn");
    fs::write(&script, "run \"exit 3\"\nrun \"echo still here\"\n").unwrap();

    auryn()
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("still here"))
        .stderr(predicate::str::contains("1 failed statement"));
}

#[test]
fn test_parsers_flag_selects_directory() {
    let dir = tempfile::tempdir().unwrap();
    let parsers = dir.path().join("custom");
    fs::create_dir_all(&parsers).unwrap();
    fs::write(parsers.join("shout.sh"), "tr a-z A-Z\n").unwrap();
    let script = dir.path().join("p.auryn");
    fs::write(&script, "run \"echo quiet\" parsewith shout as $loud\n").unwrap();

    auryn()
        .arg(&script)
        .arg("--parsers")
        .arg(&parsers)
        .arg("--dump-streams")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"QUIET\""));
}

#[test]
fn test_debug_flag_traces_stream_writes() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("d.auryn");
    fs::write(&script, "run \"echo x\" as $traced\n").unwrap();

    auryn()
        .env_remove("RUST_LOG")
        .arg(&script)
        .arg("--debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("stored stream"));
}

#[test]
fn test_unreadable_script() {
    auryn()
        .arg("/definitely/not/here.auryn")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read script"));
}
