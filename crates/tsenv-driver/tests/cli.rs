//! Command-line tests for the `tsenv` binary.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn tsenv(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsenv"))
        .args(args)
        .current_dir(dir)
        .env_remove("TSENV_LOG")
        .env_remove("RUST_LOG")
        .env_remove("TSENV_LIB_DIR")
        .output()
        .expect("Failed to run tsenv")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn read_writes_json_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("env.d.ts"), "interface Foo { x: number }\ndeclare var v: Foo;").expect("write");

    let output = tsenv(&["read", "env.d.ts"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(json["types"][0]["qName"], serde_json::json!(["Foo"]));
    assert_eq!(json["globals"][0]["type"], json["types"][0]["type"]);
}

#[test]
fn read_writes_output_file_and_verify_accepts_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("env.d.ts"),
        "declare class K { constructor(n: number); method(n: number): boolean; }",
    )
    .expect("write");

    let output = tsenv(&["read", "env.d.ts", "-o", "out.json", "--pretty"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let text = fs::read_to_string(dir.path().join("out.json")).expect("output file");
    assert!(text.contains("\n  \"data\""));

    let output = tsenv(&["verify", "out.json"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report = stdout(&output);
    assert!(report.contains("Class"));
    assert!(report.contains("ClassInstance"));
    assert!(report.contains("1 globals, 1 types, 0 ambient"));
}

#[test]
fn diagnostics_are_warnings() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("env.d.ts"), "declare var bad: Missing;").expect("write");

    let output = tsenv(&["read", "env.d.ts", "--diagnostics", "plain"], dir.path());
    assert!(output.status.success());
    assert!(stderr(&output).contains("TypeScript compiler :: env.d.ts (1,18): Cannot find name 'Missing'."));
    let json: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(json["globals"][0]["qName"], serde_json::json!(["bad"]));
}

#[test]
fn env_profile_reads_library_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lib = dir.path().join("lib");
    fs::create_dir(&lib).expect("mkdir");
    fs::write(lib.join("lib.es5.d.ts"), "declare var NaN: number;\ninterface Object { toString(): string }").expect("write");

    let output = tsenv(&["read", "--env", "es5", "--lib-dir", "lib"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(json["globals"][0]["qName"], serde_json::json!(["NaN"]));
    assert_eq!(json["types"][0]["qName"], serde_json::json!(["Object"]));
}

#[test]
fn failures_exit_non_zero() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = tsenv(&["read"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no input files"));

    let output = tsenv(&["read", "missing.d.ts"], dir.path());
    assert!(!output.status.success());

    let output = tsenv(&["read", "--env", "es6"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("library directory"));

    fs::write(dir.path().join("bad.json"), r#"{"data": [{"kind": "ClassInstance", "classType": 3}], "globals": [], "types": [], "ambient": []}"#)
        .expect("write");
    let output = tsenv(&["verify", "bad.json"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("refers to missing record 3"));
}

#[test]
fn lex_and_parse_dump_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("env.d.ts"), "declare var x: number;").expect("write");

    let output = tsenv(&["lex", "env.d.ts"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("Total tokens"));

    let output = tsenv(&["parse", "env.d.ts"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("SourceFile"));
}
