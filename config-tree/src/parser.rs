use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::ConfigNode;

/// Errors raised while reading a configuration record.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input could not be tokenized as XML.
    #[error("failed to parse config XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Tag, attribute or text bytes were not valid UTF-8.
    #[error("invalid UTF-8 in config XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// An entity or escaped value could not be decoded.
    #[error("failed to decode config XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// The record file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Document structure is broken (unbalanced tags, several roots, no root).
    #[error("malformed config XML: {0}")]
    Malformed(String),
}

/// Parse XML bytes into a [`ConfigNode`] tree.
///
/// Whitespace-only text between elements is dropped, so `<username/>` and
/// `<username>  </username>` both parse with `text == None`.
pub fn parse(xml: &[u8]) -> Result<ConfigNode, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<ConfigNode> = Vec::new();
    let mut root: Option<ConfigNode> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(start_node(&e, &reader)?),
            Event::Empty(e) => {
                let node = start_node(&e, &reader)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                append_text(stack.last_mut(), text);
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                append_text(stack.last_mut(), text);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    ParseError::Malformed("closing tag without matching open tag".to_string())
                })?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Malformed(format!(
            "element <{}> is not closed",
            open.tag
        )));
    }

    root.ok_or_else(|| ParseError::Malformed("document has no root element".to_string()))
}

/// Read and parse a configuration record from disk.
pub fn parse_file(path: &Path) -> Result<ConfigNode, ParseError> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}

fn attach(
    stack: &mut [ConfigNode],
    root: &mut Option<ConfigNode>,
    node: ConfigNode,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::Malformed(format!(
            "second top-level element <{}>",
            node.tag
        )));
    }
    *root = Some(node);
    Ok(())
}

fn append_text(current: Option<&mut ConfigNode>, text: String) {
    let Some(current) = current else {
        return;
    };
    if text.trim().is_empty() {
        return;
    }
    match &mut current.text {
        Some(existing) => existing.push_str(&text),
        None => current.text = Some(text),
    }
}

fn start_node(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<ConfigNode, ParseError> {
    let mut node = ConfigNode::new(qname_to_string(e.name())?);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = qname_to_string(attr.key)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        node.attributes.insert(key, value);
    }

    Ok(node)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}
