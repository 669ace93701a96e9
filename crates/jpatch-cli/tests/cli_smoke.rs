use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const DOCUMENT: &str = r#"{"a":{"1":2},"b":{}}"#;
const MOVE_PATCH: &str = r#"[
  {"op":"move","from":"/a/1","path":"/b/1"},
  {"op":"test","path":"/b/1","value":2}
]"#;

fn write_tempfile(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create tempfile");
    write!(file, "{contents}").expect("write tempfile");
    file
}

fn jpatch() -> Command {
    Command::cargo_bin("jpatch").expect("binary jpatch should be built")
}

fn parse_stdout(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn help_succeeds() {
    jpatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Apply RFC 6902 JSON Patch documents."));
}

#[test]
fn single_dash_version_is_normalized() {
    jpatch().arg("-version").assert().success().stdout(predicate::str::contains("jpatch version"));
}

#[test]
fn applies_patch_to_document_file() {
    let patch = write_tempfile(MOVE_PATCH);
    let document = write_tempfile(DOCUMENT);

    let assert = jpatch().arg(patch.path()).arg(document.path()).assert().success();
    let actual = parse_stdout(&assert.get_output().stdout);
    assert_eq!(actual, serde_json::json!({"a":{},"b":{"1":2}}));
}

#[test]
fn single_argument_reads_document_from_stdin() {
    let patch = write_tempfile(r#"{"op":"add","path":"/-","value":"qux"}"#);

    jpatch()
        .arg(patch.path())
        .write_stdin(r#"["foo","bar"]"#)
        .assert()
        .success()
        .stdout("[\"foo\",\"bar\",\"qux\"]\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn large_integers_pass_through_unchanged() {
    let patch = write_tempfile(r#"[{"op":"add","path":"/x","value":1}]"#);

    jpatch()
        .arg(patch.path())
        .write_stdin(r#"{"id":9007199254740993,"u":18446744073709551615}"#)
        .assert()
        .success()
        .stdout("{\"id\":9007199254740993,\"u\":18446744073709551615,\"x\":1}\n");
}

#[test]
fn pretty_output_is_indented() {
    let patch = write_tempfile(r#"[{"op":"replace","path":"/baz","value":"boo"}]"#);

    jpatch()
        .arg("-pretty")
        .arg(patch.path())
        .write_stdin(r#"{"baz":"qux"}"#)
        .assert()
        .success()
        .stdout("{\n  \"baz\": \"boo\"\n}\n");
}

#[test]
fn yaml_mode_reads_and_writes_yaml() {
    let patch = write_tempfile("- op: add\n  path: /b\n  value: 2\n");

    jpatch()
        .arg("-yaml")
        .arg(patch.path())
        .write_stdin("a: 1\n")
        .assert()
        .success()
        .stdout("a: 1\nb: 2\n");
}

#[test]
fn check_reports_operation_count() {
    let patch = write_tempfile(MOVE_PATCH);

    jpatch().arg("-check").arg(patch.path()).assert().success().stdout("2 operation(s)\n");
}

#[test]
fn check_rejects_malformed_patch() {
    let patch = write_tempfile(r#"[{"op":"explode","path":"/a"}]"#);

    jpatch()
        .arg("-check")
        .arg(patch.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Operation is invalid"));
}

#[test]
fn failed_test_operation_exits_with_error() {
    let patch = write_tempfile(r#"[{"op":"test","path":"/baz","value":"bar"}]"#);

    jpatch()
        .arg(patch.path())
        .write_stdin(r#"{"baz":"qux"}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Could not validate JSON"));
}

#[test]
fn missing_document_file_is_reported() {
    let patch = write_tempfile(MOVE_PATCH);
    let dir = tempdir().expect("create tempdir");
    let missing = dir.path().join("missing.json");

    jpatch()
        .arg(patch.path())
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn output_flag_writes_file() {
    let patch = write_tempfile(MOVE_PATCH);
    let document = write_tempfile(DOCUMENT);
    let dir = tempdir().expect("create tempdir");
    let out = dir.path().join("patched.json");

    jpatch()
        .arg(format!("-o={}", out.display()))
        .arg(patch.path())
        .arg(document.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out).expect("output file readable");
    assert_eq!(written, "{\"a\":{},\"b\":{\"1\":2}}\n");
}

#[test]
fn too_many_arguments_prints_usage() {
    jpatch()
        .args(["a.json", "b.json", "c.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage: jpatch"));
}
