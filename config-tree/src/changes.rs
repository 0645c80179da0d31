//! Path-addressed change lists between two snapshots of the same tree.

use serde::Serialize;

use crate::ConfigNode;

/// A single difference between a `before` and an `after` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// Element exists only in `after`.
    Added { path: String, value: Option<String> },
    /// Element exists only in `before`.
    Removed { path: String, value: Option<String> },
    /// Element exists in both with different text.
    Modified {
        path: String,
        before: Option<String>,
        after: Option<String>,
    },
}

impl Change {
    pub fn path(&self) -> &str {
        match self {
            Change::Added { path, .. }
            | Change::Removed { path, .. }
            | Change::Modified { path, .. } => path,
        }
    }

    /// Replace every carried value with `mask` when `sensitive` matches the path.
    pub fn masked(self, sensitive: impl Fn(&str) -> bool, mask: &str) -> Change {
        if !sensitive(self.path()) {
            return self;
        }
        let hide = |value: Option<String>| value.map(|_| mask.to_string());
        match self {
            Change::Added { path, value } => Change::Added {
                path,
                value: hide(value),
            },
            Change::Removed { path, value } => Change::Removed {
                path,
                value: hide(value),
            },
            Change::Modified {
                path,
                before,
                after,
            } => Change::Modified {
                path,
                before: hide(before),
                after: hide(after),
            },
        }
    }
}

/// Compare two optional snapshots of the same element.
///
/// Either side may be missing, in which case every element of the other side
/// is reported as added or removed. Children are matched by tag and position.
pub fn changes(before: Option<&ConfigNode>, after: Option<&ConfigNode>) -> Vec<Change> {
    let mut out = Vec::new();
    match (before, after) {
        (Some(b), Some(a)) => compare(b, a, &b.tag, &mut out),
        (Some(b), None) => one_sided(b, &b.tag, Side::Before, &mut out),
        (None, Some(a)) => one_sided(a, &a.tag, Side::After, &mut out),
        (None, None) => {}
    }
    out
}

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

fn compare(before: &ConfigNode, after: &ConfigNode, path: &str, out: &mut Vec<Change>) {
    if normalize(&before.text) != normalize(&after.text) {
        out.push(Change::Modified {
            path: path.to_string(),
            before: normalize(&before.text).map(str::to_string),
            after: normalize(&after.text).map(str::to_string),
        });
    }

    for tag in child_tags(before, after) {
        let left: Vec<&ConfigNode> = before.children.iter().filter(|n| n.tag == tag).collect();
        let right: Vec<&ConfigNode> = after.children.iter().filter(|n| n.tag == tag).collect();
        let repeated = left.len().max(right.len()) > 1;

        for i in 0..left.len().max(right.len()) {
            let child_path = if repeated {
                format!("{path}.{tag}[{}]", i + 1)
            } else {
                format!("{path}.{tag}")
            };
            match (left.get(i), right.get(i)) {
                (Some(l), Some(r)) => compare(l, r, &child_path, out),
                (Some(l), None) => one_sided(l, &child_path, Side::Before, out),
                (None, Some(r)) => one_sided(r, &child_path, Side::After, out),
                (None, None) => {}
            }
        }
    }
}

fn one_sided(node: &ConfigNode, path: &str, side: Side, out: &mut Vec<Change>) {
    let value = normalize(&node.text).map(str::to_string);
    out.push(match side {
        Side::Before => Change::Removed {
            path: path.to_string(),
            value,
        },
        Side::After => Change::Added {
            path: path.to_string(),
            value,
        },
    });
    for child in &node.children {
        one_sided(child, &format!("{path}.{}", child.tag), side, out);
    }
}

/// Child tags of both nodes in first-seen order.
fn child_tags<'a>(before: &'a ConfigNode, after: &'a ConfigNode) -> Vec<&'a str> {
    let mut tags: Vec<&str> = Vec::new();
    for child in before.children.iter().chain(after.children.iter()) {
        if !tags.contains(&child.tag.as_str()) {
            tags.push(&child.tag);
        }
    }
    tags
}

/// Blank text counts as no text. Anything else is compared verbatim.
fn normalize(input: &Option<String>) -> Option<&str> {
    input.as_deref().filter(|s| !s.trim().is_empty())
}

/// Render changes as one line each: `+` added, `-` removed, `~` modified.
pub fn format_text(entries: &[Change]) -> String {
    let show = |value: &Option<String>| value.as_deref().unwrap_or("(empty)").to_string();
    entries
        .iter()
        .map(|entry| match entry {
            Change::Added { path, value } => format!("+ {path} = {}", show(value)),
            Change::Removed { path, value } => format!("- {path} (was {})", show(value)),
            Change::Modified {
                path,
                before,
                after,
            } => format!("~ {path}: {} -> {}", show(before), show(after)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render changes as pretty JSON.
pub fn format_json(entries: &[Change]) -> String {
    serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string())
}
