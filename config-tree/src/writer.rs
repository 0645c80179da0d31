use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::tree::ConfigNode;

/// Errors raised while persisting a configuration record.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Serialization to XML failed.
    #[error("failed to serialize config XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The record file could not be written or moved into place.
    #[error("failed to write config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a tree into an XML document with a leading declaration.
pub fn write(node: &ConfigNode) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    write_node(&mut writer, node)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize a tree and replace `path` with it.
///
/// The document is written next to the target first and renamed over it, so
/// readers never observe a half-written record.
pub fn write_file(node: &ConfigNode, path: &Path) -> Result<(), WriteError> {
    let bytes = write(node)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, bytes)?;
    fs::rename(&staging, path)?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &ConfigNode) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(node.tag.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}
