//! Integration test: run the `lexdir` binary against the repository data and
//! against scratch copies of it, checking stdout and the exit status.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn lexdir(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lexdir"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("failed to run lexdir")
}

/// Copy `schemas/`, `samples/`, and the manifest into a temp directory.
fn scratch_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = repo_root();
    for sub in ["schemas", "samples"] {
        std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        for entry in std::fs::read_dir(root.join(sub)).unwrap() {
            let path = entry.unwrap().path();
            std::fs::copy(&path, dir.path().join(sub).join(path.file_name().unwrap())).unwrap();
        }
    }
    std::fs::copy(root.join("lexdir.yaml"), dir.path().join("lexdir.yaml")).unwrap();
    dir
}

#[test]
fn test_default_run_passes() {
    let output = lexdir(&repo_root(), &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout:\n{stdout}");
    assert!(stdout.contains("Validating lawyer-example.json against lawyer.schema.json:"));
    assert!(stdout.contains("Validating lawfirm-example.json against lawfirm.schema.json:"));
    assert_eq!(stdout.matches("✓ Valid").count(), 2);
    assert!(stdout.contains("✓ All validations passed!"));
}

#[test]
fn test_missing_license_number_exits_one() {
    let repo = scratch_repo();
    let path = repo.path().join("samples/lawyer-example.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc.as_object_mut().unwrap().remove("licenseNumber");
    std::fs::write(&path, doc.to_string()).unwrap();

    let output = lexdir(repo.path(), &["check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(stdout.contains("✗ Invalid"));
    assert!(stdout.contains("  - (root): \"licenseNumber\" is a required property"));
    assert!(stdout.contains("✗ Some validations failed!"));
}

#[test]
fn test_json_format_is_parseable() {
    let output = lexdir(&repo_root(), &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["passed"], true);
    assert_eq!(report["checks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_missing_referenced_schema_is_fatal() {
    let repo = scratch_repo();
    std::fs::remove_file(repo.path().join("schemas/address.schema.json")).unwrap();
    std::fs::write(
        repo.path().join("lexdir.yaml"),
        "schemas:\n  - certification.schema.json\n  - specialization.schema.json\n  - lawfirm.schema.json\n  - lawyer.schema.json\n",
    )
    .unwrap();

    let output = lexdir(repo.path(), &["check"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "no report on fatal link error");
    assert!(stderr.contains("address.schema.json"), "stderr:\n{stderr}");
}

#[test]
fn test_validate_subcommand_reports_document_path() {
    let output = lexdir(
        &repo_root(),
        &["validate", "--schema", "lawfirm.schema.json", "samples/lawfirm-example.json"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout:\n{stdout}");
    assert!(stdout.contains("Validating samples/lawfirm-example.json against lawfirm.schema.json:"));
}

#[test]
fn test_schemas_subcommand_lists_links() {
    let output = lexdir(&repo_root(), &["schemas"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("lawyer.schema.json  https://schemas.lexdir.org/legal/lawyer.schema.json"));
    assert!(stdout.contains("    -> https://schemas.lexdir.org/legal/address.schema.json"));
}
