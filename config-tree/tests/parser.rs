use std::path::PathBuf;

use config_tree::{parse, parse_file, ParseError};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_hasync_block_from_fixture() {
    let node = parse_file(&fixture("fixtures/opnsense-hasync.xml")).expect("parse should succeed");
    assert_eq!(node.tag, "opnsense");

    let hasync = node.get_child("hasync").expect("hasync should exist");
    assert_eq!(hasync.get_text(&["pfsyncinterface"]), Some("opt1"));
    assert_eq!(hasync.get_text(&["synchronizealiases"]), Some("on"));
    assert_eq!(
        node.get_text(&["interfaces", "opt1", "descr"]),
        Some("sync")
    );
}

#[test]
fn empty_elements_have_no_text() {
    let node = parse(
        br#"<opnsense><hasync><username/><password>  </password></hasync></opnsense>"#,
    )
    .expect("parse");
    let hasync = node.get_child("hasync").expect("hasync");
    assert!(hasync.has_child("username"));
    assert_eq!(hasync.get_text(&["username"]), None);
    assert_eq!(hasync.get_text(&["password"]), None);
}

#[test]
fn entities_and_attributes_are_decoded() {
    let node = parse(br#"<opnsense><hasync note="a&amp;b"><password>p&lt;w</password></hasync></opnsense>"#)
        .expect("parse");
    let hasync = node.get_child("hasync").expect("hasync");
    assert_eq!(hasync.attributes.get("note").map(String::as_str), Some("a&b"));
    assert_eq!(hasync.get_text(&["password"]), Some("p<w"));
}

#[test]
fn rejects_unclosed_elements() {
    let err = parse(br#"<opnsense><hasync>"#).expect_err("should fail");
    assert!(matches!(err, ParseError::Malformed(_)));
}

#[test]
fn rejects_documents_without_root() {
    let err = parse(b"<?xml version=\"1.0\"?>").expect_err("should fail");
    assert!(matches!(err, ParseError::Malformed(_)));
}
