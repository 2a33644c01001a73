//! Integration tests for CLI subcommands (validate-config, regen-certs, setup)

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd() -> Command {
    cargo_bin_cmd!()
}

fn data_dir(dir: &TempDir) -> String {
    dir.path().join("data").to_str().unwrap().to_string()
}

fn write_config(dir: &TempDir, body: &str) {
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("config.json"), body).unwrap();
}

const VALID: &str = r#"{
    "endpoints": {
        "account.vendor.test": "127.0.0.1:8080"
    },
    "config": {
        "decryptOutgoing": true
    }
}
"#;

// ---------- validate-config ----------

#[test]
fn validate_config_valid() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);

    let output = cmd()
        .args(["validate-config", "--data-dir", &data_dir(&dir)])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    assert!(output.status.success());
    assert!(stdout.contains("Configuration is valid!"), "{}", stdout);
    assert!(stdout.contains("Endpoints: 1"), "{}", stdout);
    assert!(
        stdout.contains("account.vendor.test -> 127.0.0.1:8080"),
        "{}",
        stdout
    );
    assert!(stdout.contains("HTTPS: (not set)"), "{}", stdout);
}

#[test]
fn validate_config_invalid() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{ not json");

    let output = cmd()
        .args(["validate-config", "--data-dir", &data_dir(&dir)])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    assert!(!output.status.success());
    assert!(stderr.contains("config is invalid"), "{}", stderr);
}

#[test]
fn validate_config_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");

    let output = cmd()
        .args(["validate-config", "--config", path.to_str().unwrap()])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    assert!(!output.status.success());
    assert!(stderr.contains("config is nonexistent"), "{}", stderr);
}

// ---------- regen-certs ----------

#[test]
fn regen_certs_sets_https_flag() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);

    let output = cmd()
        .args(["regen-certs", "--data-dir", &data_dir(&dir)])
        .write_stdin("\n\ny\n\n")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    assert!(output.status.success(), "{}", stdout);
    assert!(stdout.contains("finished modifying the config"), "{}", stdout);

    let data = dir.path().join("data");
    assert!(data.join("cert.pem").is_file());
    assert!(data.join("key.pem").is_file());
    let config = fs::read_to_string(data.join("config.json")).unwrap();
    assert!(config.contains(r#""https": true"#), "{}", config);
}

#[test]
fn regen_certs_without_config_fails_after_issuing() {
    let dir = TempDir::new().unwrap();

    let output = cmd()
        .args(["regen-certs", "--data-dir", &data_dir(&dir)])
        .write_stdin("\n\nn\n")
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("[err]: there is no file at"), "{}", stderr);
    assert!(stderr.contains("running setup"), "{}", stderr);

    let data = dir.path().join("data");
    assert!(data.join("cert.pem").is_file());
    assert!(!data.join("config.json").exists());
}

// ---------- setup ----------

#[test]
fn setup_declined_exits_cleanly() {
    let dir = TempDir::new().unwrap();

    let output = cmd()
        .args(["setup", "--data-dir", &data_dir(&dir)])
        .write_stdin("\n2\na.vendor\na.mine\n\nn\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(!Path::new(&data_dir(&dir)).exists());
}

#[test]
fn setup_custom_writes_config() {
    let dir = TempDir::new().unwrap();

    let output = cmd()
        .args(["setup", "--data-dir", &data_dir(&dir)])
        .write_stdin("\n2\na.vendor\na.mine\n\ny\n\n\nn\n\n\n")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    assert!(output.status.success(), "{}", stdout);
    assert!(
        stdout.contains("run this program again to use the new configuration"),
        "{}",
        stdout
    );
    let config = fs::read_to_string(dir.path().join("data").join("config.json")).unwrap();
    assert!(config.contains(r#""a.vendor": "a.mine""#), "{}", config);
    assert!(config.contains(r#""https": false"#), "{}", config);
}

#[test]
fn setup_with_bad_catalog_fails() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.toml");
    fs::write(&catalog, "[[endpoints]]\nname = \"account\"\n").unwrap();

    let output = cmd()
        .args([
            "setup",
            "--data-dir",
            &data_dir(&dir),
            "--catalog",
            catalog.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("[err]: Catalog error"), "{}", stderr);
}

#[test]
fn setup_with_closed_stdin_fails() {
    let dir = TempDir::new().unwrap();

    let output = cmd()
        .args(["setup", "--data-dir", &data_dir(&dir)])
        .write_stdin("")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}
