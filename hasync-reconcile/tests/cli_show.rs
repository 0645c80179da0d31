use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn write_settings(dir: &Path, config: &Path) -> PathBuf {
    let settings = dir.join("settings.toml");
    fs::write(
        &settings,
        format!(
            r#"
config_path = '{}'

[queries]
interfaces = ['echo', '{{"lan": "LAN"}}']
services = ['echo', '{{"aliases": "Aliases", "certs": "Certificates"}}']
"#,
            config.display()
        ),
    )
    .expect("write settings");
    settings
}

#[test]
fn show_prints_fields_and_masks_password() {
    let dir = tempdir().expect("tempdir");
    let settings = write_settings(dir.path(), &fixture("fixtures/opnsense-hasync.xml"));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hasync-reconcile"));
    cmd.env("NO_COLOR", "1")
        .arg("show")
        .arg("--settings")
        .arg(&settings)
        .arg("--describe")
        .assert()
        .success()
        .stdout(predicate::str::contains("synchronize_interface:    opt1"))
        .stdout(predicate::str::contains("remote_system_password:   (set)"))
        .stdout(predicate::str::contains("- certs (Certificates)"))
        .stdout(predicate::str::contains("- legacyplugin (not offered by host)"))
        .stdout(predicate::str::contains("v3rys3cure").not());
}

#[test]
fn show_json_for_record_without_block() {
    let dir = tempdir().expect("tempdir");
    let settings = write_settings(dir.path(), &fixture("fixtures/opnsense-no-hasync.xml"));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hasync-reconcile"));
    cmd.arg("show")
        .arg("--settings")
        .arg(&settings)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exists\": false"));
}
