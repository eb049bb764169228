use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ci-automation"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_file_input_success() {
    let temp_dir = TempDir::new().unwrap();
    let config = write(
        temp_dir.path(),
        "config.json",
        r#"{"processing": {"default_multiplier": 2}}"#,
    );
    let input = write(
        temp_dir.path(),
        "input.json",
        r#"{"name": "Test Data", "value": 10}"#,
    );

    let output = run(&["--config", &config, "--input", &input], temp_dir.path());

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["processed_value"], 20);
    assert_eq!(result["status"], "success");
}

#[test]
fn test_missing_input_exits_non_zero_and_logs() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&["--input", "missing.json"], temp_dir.path());

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File not found"));
    assert!(stderr.contains("ERROR"));
}

#[test]
fn test_missing_config_uses_defaults_with_warning() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&[], temp_dir.path());

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARNING"));
    assert!(stderr.contains("using defaults"));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["processed_value"], 10);
}

#[test]
fn test_strict_mode_requires_config() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(&["--strict"], temp_dir.path());

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_record_exit_code_is_configurable() {
    let temp_dir = TempDir::new().unwrap();
    let input = write(temp_dir.path(), "bad.json", r#"{"name": 5, "value": "ten"}"#);
    let fatal = write(temp_dir.path(), "fatal.json", "{}");
    let lenient = write(
        temp_dir.path(),
        "lenient.json",
        r#"{"processing": {"fail_on_invalid": false}}"#,
    );

    let output = run(&["--config", &fatal, "--input", &input], temp_dir.path());
    assert_eq!(output.status.code(), Some(3));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["status"], "failure");
    assert_eq!(result["violations"].as_array().unwrap().len(), 2);

    let output = run(&["--config", &lenient, "--input", &input], temp_dir.path());
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_log_file_is_appended() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("run.log");
    let config = write(
        temp_dir.path(),
        "config.json",
        &format!(
            r#"{{"logging": {{"level": "INFO", "format": "[{{level}}] {{message}}", "file": {}}}}}"#,
            serde_json::to_string(&log_path).unwrap()
        ),
    );

    for _ in 0..2 {
        let output = run(&["--config", &config], temp_dir.path());
        assert_eq!(output.status.code(), Some(0));
    }

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.matches("[INFO] Starting ci-automation").count(), 2);
    assert!(log.contains("Processing complete"));
}
