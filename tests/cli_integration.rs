//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Get path to the powder binary
fn powder_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_powder"))
}

/// Run powder with passphrase from stdin
fn run_powder_with_passphrase(args: &[&str], passphrase: &str) -> Output {
    let mut child = Command::new(powder_bin())
        .arg("--passphrase-stdin")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn powder");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., file not found)
        let _ = stdin.write_all(passphrase.as_bytes());
    }

    child.wait_with_output().expect("failed to wait for powder")
}

/// Get path to testdata directory
fn testdata_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("testdata");
    path.push(filename);
    path
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: {}",
        what,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Decrypt known ciphertext in both format versions.
#[test]
fn test_decrypt_known_ciphertext() {
    let temp_dir = TempDir::new().unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt")).unwrap();

    for name in ["hello.txt.powder", "hello-legacy.txt.powder"] {
        let output = temp_dir.path().join(format!("{}.decrypted", name));
        let result = run_powder_with_passphrase(
            &[
                "decrypt",
                "-i",
                testdata_path(name).to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
            ],
            "test\n",
        );
        assert_success(&result, "decrypt");
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
    }
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = testdata_path("hello.txt");
    let encrypted_path = temp_dir.path().join("hello-encrypted.txt.powder");
    let decrypted_path = temp_dir.path().join("hello-decrypted.txt");

    let result = run_powder_with_passphrase(
        &[
            "encrypt",
            "-i",
            plaintext_path.to_str().unwrap(),
            "-o",
            encrypted_path.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt");

    let result = run_powder_with_passphrase(
        &[
            "decrypt",
            "-i",
            encrypted_path.to_str().unwrap(),
            "-o",
            decrypted_path.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "decrypt");

    let original = fs::read_to_string(&plaintext_path).unwrap();
    let decrypted = fs::read_to_string(&decrypted_path).unwrap();
    assert_eq!(original, decrypted);
}

#[test]
fn test_check_reports_version() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let current = temp_dir.path().join("current.powder");
    let legacy = temp_dir.path().join("legacy.powder");

    fs::write(&plaintext, "user: admin").unwrap();

    let result = run_powder_with_passphrase(
        &[
            "encrypt",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            current.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt");

    let result = run_powder_with_passphrase(
        &[
            "encrypt",
            "--legacy",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            legacy.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt --legacy");

    for (path, expected) in [
        (&current, "encrypted (format v2)"),
        (&legacy, "encrypted (format v1)"),
        (&plaintext, "not encrypted"),
    ] {
        let result = Command::new(powder_bin())
            .args(["check", "-i", path.to_str().unwrap()])
            .output()
            .unwrap();
        assert_success(&result, "check");
        assert_eq!(String::from_utf8_lossy(&result.stdout).trim(), expected);
    }
}

#[test]
fn test_update_operation() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.txt.powder");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&plaintext1, "Original content").unwrap();

    let result = run_powder_with_passphrase(
        &[
            "encrypt",
            "--legacy",
            "-i",
            plaintext1.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt");

    fs::write(&plaintext2, "Updated content").unwrap();

    let result = run_powder_with_passphrase(
        &[
            "update",
            "-i",
            plaintext2.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "update");

    let result = run_powder_with_passphrase(
        &[
            "decrypt",
            "-i",
            encrypted.to_str().unwrap(),
            "-o",
            decrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "decrypt");

    assert_eq!(fs::read_to_string(&decrypted).unwrap(), "Updated content");
}

#[test]
fn test_update_with_wrong_passphrase_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.txt.powder");

    fs::write(&plaintext1, "Original").unwrap();
    let result = run_powder_with_passphrase(
        &[
            "encrypt",
            "--legacy",
            "-i",
            plaintext1.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "correct_password",
    );
    assert_success(&result, "encrypt");

    fs::write(&plaintext2, "Updated").unwrap();
    let result = run_powder_with_passphrase(
        &[
            "update",
            "-i",
            plaintext2.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "wrong_password",
    );

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("passphrase"),
        "Expected error message about the passphrase, got: {}",
        stderr
    );
}

#[test]
fn test_decrypt_plain_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("output.txt");

    let result = run_powder_with_passphrase(
        &[
            "decrypt",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "test",
    );

    assert!(!result.status.success());
    assert!(!output.exists());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("Error: "), "got: {}", stderr);
}

#[test]
fn test_decrypt_nonexistent_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let nonexistent = temp_dir.path().join("nonexistent.powder");
    let output = temp_dir.path().join("output.txt");

    let result = run_powder_with_passphrase(
        &[
            "decrypt",
            "-i",
            nonexistent.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "test",
    );

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_empty_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("empty.txt");
    let encrypted = temp_dir.path().join("empty.txt.powder");
    let decrypted = temp_dir.path().join("empty-decrypted.txt");

    fs::write(&plaintext, b"").unwrap();

    let result = run_powder_with_passphrase(
        &[
            "encrypt",
            "--legacy",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt");

    let result = run_powder_with_passphrase(
        &[
            "decrypt",
            "-i",
            encrypted.to_str().unwrap(),
            "-o",
            decrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "decrypt");

    assert_eq!(fs::read(&decrypted).unwrap(), b"");
}
