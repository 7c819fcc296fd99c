//! Integration tests for the planview CLI
//!
//! These tests run the built binary against plan fixtures in a temp directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Get the path to the planview binary
fn planview_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    // In debug mode, binary is at target/debug/planview
    path.push("planview");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Build a planview command isolated from the user's settings files
fn planview_in(dir: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(planview_binary());
    command
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("PLANVIEW_CONFIG");
    command
}

/// Run planview command and return output
fn run_planview(dir: &Path, args: &[&str]) -> std::process::Output {
    planview_in(dir, args)
        .output()
        .expect("Failed to execute planview")
}

const PLAN_JSON: &str = r#"{
  "format_version": "1.2",
  "terraform_version": "1.6.0",
  "resource_changes": [
    {
      "address": "aws_instance.web",
      "type": "aws_instance",
      "name": "web",
      "change": {
        "actions": ["update"],
        "before": {"ami": "ami-1", "instance_type": "t2.micro", "tags": {"Name": "web"}},
        "after": {"ami": "ami-1", "instance_type": "t3.micro", "tags": {"Name": "web"}}
      }
    },
    {
      "address": "aws_s3_bucket.logs",
      "type": "aws_s3_bucket",
      "name": "logs",
      "change": {"actions": ["create"], "before": null, "after": {"bucket": "app-logs"}}
    },
    {
      "address": "aws_iam_role.app",
      "type": "aws_iam_role",
      "name": "app"
    }
  ]
}"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("plan.json"), PLAN_JSON).unwrap();
    dir
}

#[test]
fn test_planview_version() {
    let dir = TempDir::new().unwrap();
    let output = run_planview(dir.path(), &["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("planview"));
}

#[test]
fn test_planview_help() {
    let dir = TempDir::new().unwrap();
    let output = run_planview(dir.path(), &["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("view"));
    assert!(stdout.contains("diff"));
    assert!(stdout.contains("vars"));
}

#[test]
fn test_view_json_format() {
    let dir = workspace();
    let output = run_planview(dir.path(), &["view", "plan.json", "--format", "json"]);

    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["groups"][0]["resource_type"], "aws_instance");
    assert_eq!(
        document["groups"][0]["rows"][0]["updated_values"],
        serde_json::json!({"instance_type": "t3.micro"})
    );
    assert_eq!(document["groups"][1]["resource_type"], "aws_s3_bucket");
    assert_eq!(document["skipped"][0]["address"], "aws_iam_role.app");
}

#[test]
fn test_view_text_format() {
    let dir = workspace();
    let output = run_planview(dir.path(), &["view", "plan.json"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aws_instance (1)"));
    assert!(stdout.contains("web  aws_instance.web  (update)"));
    assert!(stdout.contains("aws_iam_role.app"));
}

#[test]
fn test_view_strict_fails_on_malformed_record() {
    let dir = workspace();
    let output = run_planview(dir.path(), &["view", "plan.json", "--strict"]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("aws_iam_role.app"));
}

#[test]
fn test_view_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let mut child = planview_in(dir.path(), &["view", "-", "--format", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(PLAN_JSON.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["summary"]["to_add"], 1);
}

#[test]
fn test_view_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = run_planview(dir.path(), &["view", "nope.json"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read plan"));
}

#[test]
fn test_view_uses_working_directory_config() {
    let dir = workspace();
    std::fs::write(
        dir.path().join(".planview.yaml"),
        "ingest:\n  on_malformed_record: abort\n",
    )
    .unwrap();

    let output = run_planview(dir.path(), &["view", "plan.json"]);

    assert!(!output.status.success());
}

#[test]
fn test_diff_single_resource() {
    let dir = workspace();
    let output = run_planview(dir.path(), &["diff", "plan.json", "aws_instance.web"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"instance_type\": \"t3.micro\""));
    assert!(!stdout.contains("\"ami\""));
}

#[test]
fn test_vars_set_and_show() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("prod.tfvars");
    std::fs::write(&file, "# settings\ntop_domain = \"example.com\"\n").unwrap();

    let output = run_planview(
        dir.path(),
        &["vars", "set", "prod.tfvars", "hosted_zone_id=Z123", "replicas=2"],
    );
    assert!(output.status.success());

    let written = std::fs::read_to_string(&file).unwrap();
    assert_eq!(
        written,
        "# settings\ntop_domain = \"example.com\"\nhosted_zone_id = \"Z123\"\nreplicas = 2\n"
    );

    let output = run_planview(dir.path(), &["vars", "show", "prod.tfvars"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hosted_zone_id"));
    assert!(stdout.contains("(number)"));
}
