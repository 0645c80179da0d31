use std::path::PathBuf;

use config_tree::{parse, parse_file, write, write_file};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parse_write_parse_preserves_tree() {
    let first = parse_file(&fixture("fixtures/opnsense-hasync.xml")).expect("initial parse");

    let written = write(&first).expect("write should succeed");
    assert!(written.starts_with(b"<?xml version=\"1.0\"?>"));
    let second = parse(&written).expect("re-parse should succeed");

    assert_eq!(first, second);
}

#[test]
fn write_file_replaces_existing_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_path = dir.path().join("config.xml");
    std::fs::write(&out_path, "<opnsense/>").expect("seed");

    let node = parse_file(&fixture("fixtures/opnsense-no-hasync.xml")).expect("parse");
    write_file(&node, &out_path).expect("write_file should succeed");

    let reparsed = parse_file(&out_path).expect("parse_file should succeed");
    assert_eq!(node, reparsed);
    assert!(!dir.path().join("config.xml.tmp").exists());
}
