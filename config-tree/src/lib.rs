//! Element tree primitives for persisted firewall configuration records.
//!
//! The tree is owned and cheap to clone, so callers can keep an immutable
//! snapshot next to a working copy and compute a [`Change`] list between the
//! two with [`changes`].

pub mod changes;
pub mod parser;
pub mod tree;
pub mod writer;

pub use changes::{changes, format_json, format_text, Change};
pub use parser::{parse, parse_file, ParseError};
pub use tree::ConfigNode;
pub use writer::{write, write_file, WriteError};
