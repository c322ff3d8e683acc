use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

fn fragmerge() -> Command {
    let mut cmd = Command::cargo_bin("fragmerge").unwrap();
    cmd.env_remove("FRAGMERGE_STRATEGY").env_remove("RUST_LOG");
    cmd
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("a.json"),
        r#"{"outbounds": [{"tag": "x", "priority": 2}]}"#,
    )
    .unwrap();
    fs::write(
        tmp.path().join("b.json"),
        r#"{"outbounds": [{"tag": "y", "priority": 1}]}"#,
    )
    .unwrap();
    tmp
}

#[test]
fn test_help_output() {
    fragmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Merge fragments into one configuration document",
        ))
        .stdout(predicate::str::contains("List resolved fragment files"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_version_output() {
    fragmerge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_merge_requires_input() {
    fragmerge()
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_merge_folder_to_stdout() {
    let tmp = fixture();

    fragmerge()
        .args(["merge", "-i"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(concat!(r#"{"outbounds":[{"tag":"y"},{"tag":"x"}]}"#, "\n"));
}

#[test]
fn test_merge_schema_strategy_keeps_priority() {
    let tmp = fixture();

    fragmerge()
        .args(["merge", "--strategy", "schema", "-i"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"outbounds":[{"tag": "y", "priority": 1},{"tag": "x", "priority": 2}]}"#,
        ));
}

#[test]
fn test_strategy_from_environment() {
    let tmp = fixture();

    fragmerge()
        .env("FRAGMERGE_STRATEGY", "schema")
        .args(["merge", "-i"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""priority": 1"#));
}

#[test]
fn test_merge_pretty_to_file() {
    let tmp = fixture();
    let output = tmp.path().join("merged.json");

    fragmerge()
        .args(["merge", "--pretty", "-i"])
        .arg(tmp.path().join("b.json"))
        .arg("-i")
        .arg(tmp.path().join("a.json"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\n  \"outbounds\": ["));
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value, json!({"outbounds": [{"tag": "y"}, {"tag": "x"}]}));
}

#[test]
fn test_merge_from_stdin() {
    let tmp = fixture();

    fragmerge()
        .args(["merge", "-i", "-", "-i"])
        .arg(tmp.path().join("a.json"))
        .write_stdin(r#"{"log": {"loglevel": "info"}, "outbounds": [{"tag": "z"}]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"log":{"loglevel":"info"},"outbounds":[{"tag":"z"},{"tag":"x"}]}"#,
        ));
}

#[test]
fn test_merge_type_mismatch_fails() {
    let tmp = fixture();
    fs::write(tmp.path().join("c.json"), r#"{"outbounds": {"tag": "z"}}"#).unwrap();

    fragmerge()
        .args(["merge", "-i"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "value type of key (outbounds) mismatch, source is 'object' but target not",
        ));
}

#[test]
fn test_merge_reports_decode_position() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.json"), "{\n  \"port\": 1080,\n  \"log\" {}\n}").unwrap();

    fragmerge()
        .args(["merge", "-i"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.json"))
        .stderr(predicate::str::contains(
            "failed to read config file at line 3 char 8",
        ));
}

#[test]
fn test_merge_empty_folder_fails() {
    let tmp = TempDir::new().unwrap();

    fragmerge()
        .args(["merge", "-i"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no configuration fragments found"));
}

#[test]
fn test_files_lists_fragments_in_order() {
    let tmp = fixture();
    fs::write(tmp.path().join("notes.txt"), "skip me").unwrap();
    fs::create_dir(tmp.path().join("sub")).unwrap();
    fs::write(tmp.path().join("sub").join("c.jsonc"), "{}").unwrap();

    let assert = fragmerge()
        .args(["files", "-i"])
        .arg(tmp.path())
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let names: Vec<&str> = stdout
        .lines()
        .map(|line| line.rsplit(['/', '\\']).next().unwrap())
        .collect();
    assert_eq!(names, ["a.json", "b.json", "c.jsonc"]);
}

#[test]
fn test_verbose_logs_to_stderr() {
    let tmp = fixture();

    fragmerge()
        .args(["merge", "-v", "-i"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"))
        .stderr(predicate::str::contains("merging fragments"));
}
