use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn pathseek() -> Command {
    let mut cmd = Command::cargo_bin("pathseek").expect("binary");
    cmd.env_remove("PATHSEEK_LIMIT").env_remove("RUST_LOG");
    cmd
}

fn setup_tree() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(root.join("src/util.h"), "#pragma once\n").unwrap();
    fs::write(root.join("Makefile"), "all:\n").unwrap();
    fs::write(root.join("docs/readme.txt"), "docs\n").unwrap();
    fs::write(root.join(".git/config"), "[core]\n").unwrap();
    temp
}

fn search_json(root: &Path, query: &str, extra: &[&str]) -> Vec<Value> {
    let output = pathseek()
        .arg("search")
        .arg(root)
        .arg(query)
        .arg("--json")
        .args(extra)
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    body.as_array().expect("array").clone()
}

fn paths(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["path"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn search_ranks_c_sources() {
    let temp = setup_tree();
    let records = search_json(
        temp.path(),
        "mc",
        &["--include", "*.c", "--include", "*.h"],
    );

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["path"], "src/main.c");
    assert_eq!(records[0]["dirname"], "src");
    assert_eq!(records[0]["filename"], "main.c");
    assert_eq!(records[0]["goodness"], 0);
}

#[test]
fn search_prints_text_lines() {
    let temp = setup_tree();
    pathseek()
        .arg("search")
        .arg(temp.path())
        .arg("mc")
        .arg("--include")
        .arg("*.c")
        .assert()
        .success()
        .stdout("src/main.c (0)\n");
}

#[test]
fn hidden_directories_are_never_indexed() {
    let temp = setup_tree();
    let records = search_json(temp.path(), "", &["--limit", "100"]);
    let found = paths(&records);

    assert_eq!(found.len(), 4);
    assert!(found.iter().all(|p| !p.starts_with(".git")));
}

#[test]
fn index_reports_stats_as_json() {
    let temp = setup_tree();
    let output = pathseek()
        .arg("index")
        .arg(temp.path())
        .arg("--exclude")
        .arg("*.txt")
        .arg("--json")
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["files"], 3);
    assert_eq!(body["rejected"], 1);
    assert!(body["hidden"].as_u64().unwrap() >= 1);
    assert!(body["bytes"].as_u64().unwrap() > 0);
}

#[test]
fn config_file_in_root_supplies_filters() {
    let temp = setup_tree();
    fs::write(temp.path().join("pathseek.toml"), "include = [\"*.h\"]\n").unwrap();

    let records = search_json(temp.path(), "", &[]);
    assert_eq!(paths(&records), vec!["src/util.h".to_string()]);
}

#[test]
fn explicit_config_must_exist() {
    let temp = setup_tree();
    pathseek()
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .arg("search")
        .arg(temp.path())
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read config"));
}

#[test]
fn limit_env_caps_results() {
    let temp = setup_tree();
    let output = pathseek()
        .env("PATHSEEK_LIMIT", "1")
        .arg("search")
        .arg(temp.path())
        .arg("")
        .arg("--json")
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[test]
fn limit_flag_beats_env() {
    let temp = setup_tree();
    let output = pathseek()
        .env("PATHSEEK_LIMIT", "1")
        .arg("search")
        .arg(temp.path())
        .arg("")
        .arg("--limit")
        .arg("3")
        .arg("--json")
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[test]
fn zero_limit_is_rejected() {
    let temp = setup_tree();
    pathseek()
        .arg("search")
        .arg(temp.path())
        .arg("mc")
        .arg("--limit")
        .arg("0")
        .assert()
        .failure();
}

#[test]
fn missing_root_fails() {
    let temp = tempdir().unwrap();
    pathseek()
        .arg("search")
        .arg(temp.path().join("nope"))
        .arg("mc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to index"));
}

#[test]
fn repl_answers_queries_until_quit() {
    let temp = setup_tree();
    pathseek()
        .arg("repl")
        .arg(temp.path())
        .write_stdin("main\n:quit\nmake\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("src/main.c"))
        .stdout(predicate::str::contains("Makefile").not());
}

#[test]
fn repl_changes_directory() {
    let temp = setup_tree();
    pathseek()
        .arg("repl")
        .arg(temp.path())
        .write_stdin(":cd docs\nread\n:cd nowhere\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("readme.txt (3)"))
        .stdout(predicate::str::contains("not a directory"));
}
