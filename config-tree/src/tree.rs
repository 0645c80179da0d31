use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// One element of a configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigNode {
    /// Element tag name.
    pub tag: String,
    /// Element attributes keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<ConfigNode>,
    /// Text content, `None` for empty elements such as `<username/>`.
    pub text: Option<String>,
}

impl ConfigNode {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create an element holding only text.
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut node = Self::new(tag);
        node.text = Some(text.into());
        node
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Return a mutable reference to the first child with the provided tag.
    pub fn child_mut(&mut self, tag: &str) -> Option<&mut ConfigNode> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    pub fn has_child(&self, tag: &str) -> bool {
        self.get_child(tag).is_some()
    }

    /// Walk a nested child path and return the terminal node text if found.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        current.text.as_deref()
    }

    /// Set the text of the first child named `tag`, appending the child when
    /// it does not exist yet. Returns `true` when the tree changed.
    pub fn set_child_text(&mut self, tag: &str, value: &str) -> bool {
        if let Some(child) = self.child_mut(tag) {
            if child.text.as_deref() == Some(value) {
                return false;
            }
            child.text = Some(value.to_string());
            return true;
        }
        self.children.push(ConfigNode::with_text(tag, value));
        true
    }

    /// Remove every child named `tag`. Returns how many were removed.
    pub fn remove_children(&mut self, tag: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|child| child.tag != tag);
        before - self.children.len()
    }

    /// Return the first child named `tag`, appending an empty one if missing.
    pub fn ensure_child(&mut self, tag: &str) -> &mut ConfigNode {
        let idx = match self.children.iter().position(|child| child.tag == tag) {
            Some(idx) => idx,
            None => {
                self.children.push(ConfigNode::new(tag));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }
}

impl Display for ConfigNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, value)?;
        }

        if self.children.is_empty() && self.text.is_none() {
            return write!(f, "/>");
        }

        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", text)?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigNode;

    #[test]
    fn get_text_walks_nested_path() {
        let mut root = ConfigNode::new("opnsense");
        let mut hasync = ConfigNode::new("hasync");
        hasync
            .children
            .push(ConfigNode::with_text("pfsyncinterface", "lan"));
        root.children.push(hasync);

        assert_eq!(root.get_text(&["hasync", "pfsyncinterface"]), Some("lan"));
        assert_eq!(root.get_text(&["hasync", "username"]), None);
    }

    #[test]
    fn set_child_text_reports_only_real_changes() {
        let mut node = ConfigNode::new("hasync");
        assert!(node.set_child_text("pfsyncpeerip", "10.0.0.2"));
        assert!(!node.set_child_text("pfsyncpeerip", "10.0.0.2"));
        assert!(node.set_child_text("pfsyncpeerip", "10.0.0.3"));
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.get_text(&["pfsyncpeerip"]), Some("10.0.0.3"));
    }

    #[test]
    fn ensure_child_is_idempotent() {
        let mut root = ConfigNode::new("opnsense");
        root.ensure_child("hasync").text = None;
        root.ensure_child("hasync");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.remove_children("hasync"), 1);
        assert!(!root.has_child("hasync"));
    }
}
