//! End-to-end tests driving the compiled `passbox` binary against a temp
//! data directory.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn passbox(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("passbox").unwrap();
    cmd.env_remove("PASSBOX_PASSWORD");
    cmd.arg("--dir").arg(dir);
    cmd
}

#[test]
fn set_then_show_round_trips() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "email/google", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("email/google"));

    passbox(temp.path())
        .args(["show", "email/google"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret1"));

    passbox(temp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("google").and(predicate::str::contains("secret1")));
}

#[test]
fn show_without_key_is_not_found() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .arg("show")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("passbox init"));
}

#[test]
fn malformed_paths_exit_with_invalid_path_code() {
    let temp = TempDir::new().unwrap();

    for bad in ["a/", ""] {
        passbox(temp.path())
            .args(["set", bad, "v"])
            .assert()
            .failure()
            .code(5)
            .stderr(predicate::str::contains("invalid path"));
    }
}

#[test]
fn rm_then_show_is_not_found() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "a/b", "v"])
        .assert()
        .success();
    passbox(temp.path()).args(["rm", "a/b"]).assert().success();

    passbox(temp.path())
        .args(["show", "a/b"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn export_then_import_round_trips() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    let dump = temp.path().join("dump.json");

    passbox(&src)
        .args(["set", "email/google", "secret1"])
        .assert()
        .success();

    passbox(&src)
        .arg("export")
        .arg(&dump)
        .assert()
        .success()
        .stderr(predicate::str::contains("PLAINTEXT"));

    passbox(&dst).arg("import").arg(&dump).assert().success();

    passbox(&dst)
        .args(["show", "email/google"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret1"));
}

#[test]
fn rotate_preserves_document_and_rewrites_blob() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "email/yahoo", "secret2"])
        .assert()
        .success();

    let blob_path = temp.path().join("secrets.enc");
    let blob_before = std::fs::read(&blob_path).unwrap();

    passbox(temp.path()).arg("rotate").assert().success();

    assert_ne!(std::fs::read(&blob_path).unwrap(), blob_before);

    passbox(temp.path())
        .args(["show", "email/yahoo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret2"));
}

#[test]
fn password_gate_blocks_wrong_password() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "a/b", "v"])
        .assert()
        .success();

    // Set a master password, reading the new one from stdin.
    passbox(temp.path())
        .args(["passwd", "--stdin"])
        .write_stdin("hunter2\n")
        .assert()
        .success();

    passbox(temp.path())
        .args(["--password", "hunter2", "show", "a/b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v"));

    passbox(temp.path())
        .args(["--password", "wrong", "show", "a/b"])
        .assert()
        .failure()
        .code(3);

    // The gate also accepts the password on stdin.
    passbox(temp.path())
        .args(["--password-stdin", "show", "a/b"])
        .write_stdin("hunter2\n")
        .assert()
        .success();
}

#[test]
fn set_through_scalar_reports_conflict() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "email", "scalar"])
        .assert()
        .success();

    passbox(temp.path())
        .args(["set", "email/google", "v"])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("path conflict"));
}

#[test]
fn tampered_blob_exits_with_auth_code() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "a/b", "v"])
        .assert()
        .success();

    let blob_path = temp.path().join("secrets.enc");
    let mut blob = std::fs::read(&blob_path).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x80;
    std::fs::write(&blob_path, &blob).unwrap();

    passbox(temp.path())
        .arg("show")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("authentication failed"));
}

#[test]
fn info_reports_store_status() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "a", "1"])
        .assert()
        .success();

    passbox(temp.path())
        .args(["info", "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"key_present\": true")
                .and(predicate::str::contains("\"top_level_entries\": 1")),
        );
}

#[test]
fn menu_session_drives_the_store() {
    let temp = TempDir::new().unwrap();

    // 2) set a/b = v1, 1) show a/b, 7) quit
    passbox(temp.path())
        .arg("menu")
        .write_stdin("y\n2\na/b\nv1\n1\na/b\n7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("v1").and(predicate::str::contains("Bye.")));
}

#[test]
fn menu_reports_errors_and_continues() {
    let temp = TempDir::new().unwrap();

    passbox(temp.path())
        .args(["set", "a/b", "v"])
        .assert()
        .success();

    // Deleting a missing path reports an error, then the session keeps
    // going and quits cleanly.
    passbox(temp.path())
        .arg("menu")
        .write_stdin("3\nnope/missing\n7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("error:").and(predicate::str::contains("Bye.")));
}
