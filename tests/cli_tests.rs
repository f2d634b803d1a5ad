//! CLI integration tests.
//!
//! Runs the reprcheck binary as a subprocess.

use std::process::Command;

fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_reprcheck"))
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to spawn reprcheck: {}", e));
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn cli_validate_random_documents() {
    let (code, stdout, stderr) = run(&["validate", "--seed", "7", "--count", "50", "--par", "2"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("seed: 7"), "stdout: {stdout}");
    assert!(stdout.contains("docs: 50, pass: 50, fail: 0, skipped: 0"), "stdout: {stdout}");
}

#[test]
fn cli_validate_single_input() {
    let (code, stdout, _stderr) = run(&["validate", "--seed", "3", "--count", "4", "--input", r#"{"x":{"y":[1,2]}}"#]);
    assert_eq!(code, 0);
    assert!(stdout.contains("docs: 4, pass: 4"), "stdout: {stdout}");
    assert!(stdout.contains("object: 4"), "stdout: {stdout}");
}

#[test]
fn cli_validate_pinned_config() {
    let (code, stdout, _stderr) = run(&[
        "validate", "--seed", "9", "--count", "20", "--nk", "float32", "--ct", "stream", "--missing", "true",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("float32: 20"), "stdout: {stdout}");
    assert!(stdout.contains("stream: 20"), "stdout: {stdout}");
    assert!(stdout.contains("missing: 20"), "stdout: {stdout}");
}

#[test]
fn cli_validate_zero_workers_fails() {
    let (code, _stdout, stderr) = run(&["validate", "--seed", "1", "--par", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid run parameter"), "stderr: {stderr}");
}

#[test]
fn cli_validate_unknown_number_kind_is_usage_error() {
    let (code, _stdout, stderr) = run(&["validate", "--nk", "decimal"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("decimal"), "stderr: {stderr}");
}

#[test]
fn cli_validate_input_file_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docs.txt");
    std::fs::write(&path, "[1,2]\n{bad\n\n\"s\"\n").unwrap();

    let (code, stdout, _stderr) = run(&[
        "validate",
        "--seed",
        "5",
        "--count",
        "10",
        "--input-file",
        path.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("docs: 3, pass: 2, fail: 0, skipped: 1"), "stdout: {stdout}");
}

#[test]
fn cli_validate_input_file_defaults_to_every_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docs.txt");
    std::fs::write(&path, "[1]\n{\"a\":2}\n\"s\"\n").unwrap();

    let (code, stdout, _stderr) = run(&["validate", "--seed", "5", "--input-file", path.to_str().unwrap()]);
    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("docs: 3, pass: 3, fail: 0, skipped: 0"), "stdout: {stdout}");
}

#[test]
fn cli_validate_genout_replays() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("samples.txt");
    let path_str = path.to_str().unwrap();

    let (code, _stdout, _stderr) = run(&["validate", "--seed", "11", "--count", "20", "--genout", path_str]);
    assert_eq!(code, 0);
    let samples = std::fs::read_to_string(&path).unwrap();
    assert_eq!(samples.lines().count(), 20);

    let (code, stdout, _stderr) = run(&[
        "validate",
        "--seed",
        "11",
        "--count",
        "20",
        "--input-file",
        path_str,
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("docs: 20, pass: 20"), "stdout: {stdout}");
}

#[test]
fn cli_validate_json_report() {
    let (code, stdout, _stderr) = run(&["validate", "--seed", "13", "--count", "25", "--sort-batch", "50", "--json"]);
    assert_eq!(code, 0);
    let start = stdout.find('{').unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
    assert_eq!(report["seed"], 13);
    assert_eq!(report["aborted"], false);
    assert_eq!(report["statistics"]["docs"], 25);
    assert_eq!(report["sort_reports"].as_array().unwrap().len(), 5);
}

// ============================================================================
// Other Commands
// ============================================================================

#[test]
fn cli_collate_reports_every_strategy() {
    let (code, stdout, stderr) = run(&["collate", "--seed", "3", "--count", "100"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("seed: 3, items: 100"), "stdout: {stdout}");
    assert_eq!(stdout.lines().filter(|l| l.ends_with(" compares")).count(), 5);
}

#[test]
fn cli_collate_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.txt");
    std::fs::write(&path, "3\n\"b\"\n[1,2]\nnull\n{\"k\":true}\n-1.5\n").unwrap();

    let (code, stdout, stderr) = run(&["collate", "--seed", "4", "--input-file", path.to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("seed: 4, items: 6"), "stdout: {stdout}");
    assert_eq!(stdout.lines().filter(|l| l.ends_with(" compares")).count(), 5);
}

#[test]
fn cli_collate_sorted_prints_collated_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.txt");
    std::fs::write(&path, "\"b\"\n[]\n2\nnull\n\"a\"\n").unwrap();

    let (code, stdout, _stderr) = run(&["collate", "--input-file", path.to_str().unwrap(), "--sorted"]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["null", "2", "\"a\"", "\"b\"", "[]"]);
}

#[test]
fn cli_collate_check_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mixed"), "[1]\ntrue\n\"x\"\n").unwrap();
    std::fs::write(dir.path().join("mixed.ref"), "true\n\"x\"\n[1]\n").unwrap();

    let (code, stdout, stderr) = run(&["collate", "--check-dir", dir.path().to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("(3 lines)"), "stdout: {stdout}");

    std::fs::write(dir.path().join("mixed.ref"), "[1]\ntrue\n\"x\"\n").unwrap();
    let (code, stdout, _stderr) = run(&["collate", "--check-dir", dir.path().to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stdout.contains("sort mismatch in") && stdout.contains("at line 1"), "stdout: {stdout}");
}

#[test]
fn cli_collate_check_dir_without_reference_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("orphan"), "1\n").unwrap();

    let (code, _stdout, stderr) = run(&["collate", "--check-dir", dir.path().to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn cli_pointers_lists_deepest_first() {
    let (code, stdout, _stderr) = run(&["pointers", r#"{"x":{"y":1}}"#]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["/x/y", "/x", ""]);
}

#[test]
fn cli_pointers_rejects_malformed_input() {
    let (code, _stdout, stderr) = run(&["pointers", "[1,"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn cli_convert_through_collation() {
    let (code, hex_out, _stderr) = run(&["convert", "--from", "json", "--to", "collate", "--nk", "smart", r#"{"b":1,"a":"x"}"#]);
    assert_eq!(code, 0);
    let ordered = hex_out.trim();
    assert!(hex::decode(ordered).is_ok());

    let (code, text, _stderr) = run(&["convert", "--from", "collate", "--to", "json", "--nk", "smart", ordered]);
    assert_eq!(code, 0);
    assert_eq!(text.trim(), r#"{"a":"x","b":1}"#);
}

#[test]
fn cli_convert_unknown_repr() {
    let (code, _stdout, _stderr) = run(&["convert", "--from", "yaml", "--to", "json", "1"]);
    assert_eq!(code, 2);
}

#[test]
fn cli_overheads_lists_items() {
    let (code, stdout, _stderr) = run(&["overheads"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("item: ")).count(), 13);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("Json: ")).count(), 13);
}
