use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use config_tree::parse_file;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

/// A temp dir holding a copy of `fixture_name` as config.xml and a settings
/// file whose host queries and apply step are plain shell commands.
fn workspace(fixture_name: &str, apply: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("config.xml");
    fs::copy(fixture(fixture_name), &config).expect("copy fixture");

    let settings = dir.path().join("settings.toml");
    fs::write(
        &settings,
        format!(
            r#"
config_path = '{}'
apply = [['{apply}']]

[queries]
interfaces = ['echo', '{{"wan": "WAN", "lan": "LAN", "opt1": "sync"}}']
services = ['echo', '{{"aliases": "Aliases", "certs": "Certificates", "nat": "NAT", "widgets": "Dashboard"}}']
"#,
            config.display()
        ),
    )
    .expect("write settings");
    (dir, config, settings)
}

fn cli(settings: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hasync-reconcile"));
    cmd.env("NO_COLOR", "1")
        .arg("reconcile")
        .arg("--settings")
        .arg(settings);
    cmd
}

#[test]
fn bootstraps_and_then_reports_no_change() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-no-hasync.xml", "true");

    cli(&settings)
        .args(["--synchronize-interface", "sync", "--synchronize-states", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("changed=true state=committed"))
        .stdout(predicate::str::contains("+ hasync.pfsyncenabled = on"));

    let root = parse_file(&config).expect("reparse");
    assert_eq!(root.get_text(&["hasync", "pfsyncinterface"]), Some("opt1"));
    assert_eq!(root.get_text(&["hasync", "pfsyncenabled"]), Some("on"));
    assert_eq!(root.get_text(&["system", "hostname"]), Some("fw-a"));

    cli(&settings)
        .args(["--synchronize-interface", "sync", "--synchronize-states", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("changed=false state=no-op"));
}

#[test]
fn check_mode_reports_diff_without_writing() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");
    let before = fs::read_to_string(&config).expect("read");

    cli(&settings)
        .args(["--check", "--service", "Certificates", "--service", "nat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("changed=true state=dry-run"))
        .stdout(predicate::str::contains("- hasync.synchronizealiases"))
        .stdout(predicate::str::contains("+ hasync.synchronizenat = on"));

    assert_eq!(fs::read_to_string(&config).expect("read"), before);
}

#[test]
fn services_converge_and_unlisted_flags_survive() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");

    cli(&settings)
        .args(["--service", "certs", "--service", "Dashboard"])
        .assert()
        .success();

    let root = parse_file(&config).expect("reparse");
    let block = root.get_child("hasync").expect("hasync");
    assert!(!block.has_child("synchronizealiases"));
    assert_eq!(block.get_text(&["synchronizecerts"]), Some("on"));
    assert_eq!(block.get_text(&["synchronizewidgets"]), Some("on"));
    assert_eq!(block.get_text(&["synchronizelegacyplugin"]), Some("on"));
}

#[test]
fn no_services_disables_every_listed_service() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");

    cli(&settings).arg("--no-services").assert().success();

    let root = parse_file(&config).expect("reparse");
    let block = root.get_child("hasync").expect("hasync");
    assert!(!block.has_child("synchronizealiases"));
    assert!(!block.has_child("synchronizecerts"));
    assert!(block.has_child("synchronizelegacyplugin"));
}

#[test]
fn unknown_service_fails_and_lists_alternatives() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");
    let before = fs::read_to_string(&config).expect("read");

    cli(&settings)
        .args(["--service", "NonexistentService", "--synchronize-states", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'NonexistentService'"))
        .stderr(predicate::str::contains(
            "Aliases, Certificates, NAT, Dashboard",
        ));

    assert_eq!(fs::read_to_string(&config).expect("read"), before);
}

#[test]
fn apply_failure_exits_non_zero_after_saving() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-hasync.xml", "false");

    cli(&settings)
        .args(["--synchronize-peer-ip", "10.0.0.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("apply of HA settings failed"));

    let root = parse_file(&config).expect("reparse");
    assert_eq!(root.get_text(&["hasync", "pfsyncpeerip"]), Some("10.0.0.9"));
}

#[test]
fn empty_value_clears_remote_sync_target() {
    let (_dir, config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");

    cli(&settings)
        .args(["--synchronize-config-to-ip", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("- hasync.synchronizetoip"));

    let root = parse_file(&config).expect("reparse");
    let block = root.get_child("hasync").expect("hasync");
    assert!(!block.has_child("synchronizetoip"));
    assert_eq!(block.get_text(&["username"]), Some("root"));
}

#[test]
fn password_never_reaches_stdout() {
    let (_dir, _config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");

    cli(&settings)
        .args(["--check", "--remote-system-password", "n3wS3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hasync.password"))
        .stdout(predicate::str::contains("n3wS3cret").not())
        .stdout(predicate::str::contains("v3rys3cure").not());
}

#[test]
fn declaration_file_is_overridden_by_flags() {
    let (dir, config, settings) = workspace("fixtures/opnsense-no-hasync.xml", "true");
    let declaration = dir.path().join("ha.toml");
    fs::write(
        &declaration,
        r#"
synchronize_interface = "LAN"
synchronize_states = true
services_to_synchronize = ["Aliases"]
"#,
    )
    .expect("write declaration");

    cli(&settings)
        .arg("--declaration")
        .arg(&declaration)
        .args(["--synchronize-interface", "opt1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": true"))
        .stdout(predicate::str::contains("\"state\": \"committed\""));

    let root = parse_file(&config).expect("reparse");
    assert_eq!(root.get_text(&["hasync", "pfsyncinterface"]), Some("opt1"));
    assert_eq!(root.get_text(&["hasync", "synchronizealiases"]), Some("on"));
}

#[test]
fn missing_block_without_interface_is_rejected() {
    let (_dir, _config, settings) = workspace("fixtures/opnsense-no-hasync.xml", "true");

    cli(&settings)
        .args(["--synchronize-states", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("synchronize_interface is required"));
}

#[test]
fn empty_declaration_is_rejected() {
    let (_dir, _config, settings) = workspace("fixtures/opnsense-hasync.xml", "true");

    cli(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to reconcile"));
}
