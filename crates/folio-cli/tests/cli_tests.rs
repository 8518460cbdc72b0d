//! Integration tests for the `folio` CLI binary.
//!
//! These run the CLI as a subprocess and check exit codes, stdout, and the
//! files it leaves behind.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

use folio_core::credentials::verify_password;

fn folio_bin() -> String {
    let path = env!("CARGO_BIN_EXE_folio");
    assert!(Path::new(path).exists(), "folio binary not found at {path}");
    path.to_owned()
}

/// Run folio with args and return (`exit_code`, stdout, stderr).
fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(folio_bin())
        .args(args)
        .env_remove("FOLIO_DATA_DIR")
        .env_remove("FOLIO_USERS_FILE")
        .output()
        .expect("failed to execute folio");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn read_users(path: &Path) -> BTreeMap<String, String> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("folio"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0);
    for sub in ["hash-password", "user", "docs"] {
        assert!(stdout.contains(sub), "help should list '{sub}': {stdout}");
    }
}

// ── hash-password ────────────────────────────────────────────────────

#[test]
fn test_hash_password_from_flag() {
    let (code, stdout, stderr) = run(&["hash-password", "--password", "secret"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let hash = stdout.trim();
    assert!(hash.starts_with("$argon2id$"), "unexpected hash: {hash}");
    assert!(verify_password("secret", hash));
    assert!(!verify_password("other", hash));
}

#[test]
fn test_hash_password_from_stdin() {
    let mut child = Command::new(folio_bin())
        .arg("hash-password")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn folio");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"from-stdin\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let hash = String::from_utf8(output.stdout).unwrap();
    assert!(verify_password("from-stdin", hash.trim()));
}

#[test]
fn test_hash_password_rejects_empty_stdin() {
    let output = Command::new(folio_bin())
        .arg("hash-password")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not be empty"), "stderr: {stderr}");
}

// ── user ─────────────────────────────────────────────────────────────

#[test]
fn test_user_add_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    let file_arg = file.to_str().unwrap();

    let (code, _, stderr) = run(&["user", "add", "--file", file_arg, "admin", "--password", "secret"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let users = read_users(&file);
    assert_eq!(users.len(), 1);
    assert!(verify_password("secret", &users["admin"]));
}

#[test]
fn test_user_add_replaces_password_and_keeps_others() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    let file_arg = file.to_str().unwrap();

    run(&["user", "add", "--file", file_arg, "admin", "--password", "old"]);
    run(&["user", "add", "--file", file_arg, "editor", "--password", "pen"]);
    let (code, _, stderr) = run(&["user", "add", "--file", file_arg, "admin", "--password", "new"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("updated"), "stderr: {stderr}");

    let users = read_users(&file);
    assert!(verify_password("new", &users["admin"]));
    assert!(!verify_password("old", &users["admin"]));
    assert!(verify_password("pen", &users["editor"]));
}

#[test]
fn test_user_add_rejects_blank_username() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");

    let (code, _, _) = run(&["user", "add", "--file", file.to_str().unwrap(), "", "--password", "x"]);
    assert_ne!(code, 0);
    assert!(!file.exists());
}

#[test]
fn test_user_add_reports_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("missing-dir").join("users.json");

    let (code, _, stderr) =
        run(&["user", "add", "--file", file.to_str().unwrap(), "admin", "--password", "x"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("failed to write credentials file"), "stderr: {stderr}");
    assert!(!stderr.contains("failed to read"), "stderr: {stderr}");
}

#[test]
fn test_user_list_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("users.json");
    fs::write(&file, r#"{"zoe": "$argon2id$x", "adam": "$argon2id$y"}"#).unwrap();
    let file_arg = file.to_str().unwrap();

    let (code, stdout, _) = run(&["user", "list", "--file", file_arg]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "adam\nzoe\n");

    let (code, _, _) = run(&["user", "remove", "--file", file_arg, "zoe"]);
    assert_eq!(code, 0);
    let users = read_users(&file);
    assert_eq!(users.keys().collect::<Vec<_>>(), ["adam"]);

    let (code, _, stderr) = run(&["user", "remove", "--file", file_arg, "zoe"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no such user"), "stderr: {stderr}");
}

#[test]
fn test_user_list_missing_file() {
    let (code, _, stderr) = run(&["user", "list", "--file", "/tmp/folio-test-nonexistent/users.json"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("failed to load"), "stderr: {stderr}");
}

// ── docs ─────────────────────────────────────────────────────────────

#[test]
fn test_docs_lists_like_the_server() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("changes.txt"), "").unwrap();
    fs::write(dir.path().join("about.md"), "").unwrap();
    fs::write(dir.path().join(".hidden.md"), "").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let (code, stdout, _) = run(&["docs", "--dir", dir.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "about.md\tmarkdown\nchanges.txt\ttext\n");
}

#[test]
fn test_docs_missing_directory() {
    let (code, _, stderr) = run(&["docs", "--dir", "/tmp/folio-test-nonexistent-dir"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}
