//! Explicit mutation plans for the HA block.
//!
//! Reconcilers never touch a tree directly. They read an immutable snapshot
//! and return a [`ChangeSet`]; the driver applies the accumulated plan to the
//! session in one go once every step has succeeded.

use config_tree::ConfigNode;
use serde::Serialize;

use crate::error::{ReconcileError, Result};
use crate::fields::HASYNC;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Create the empty `<hasync>` block under the root.
    CreateBlock,
    /// Write `value` into the leaf `tag`, creating it if needed.
    SetText { tag: String, value: String },
    /// Remove the leaf `tag`.
    Remove { tag: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub mutations: Vec<Mutation>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn set(&mut self, tag: &str, value: &str) {
        self.mutations.push(Mutation::SetText {
            tag: tag.to_string(),
            value: value.to_string(),
        });
    }

    pub fn remove(&mut self, tag: &str) {
        self.mutations.push(Mutation::Remove {
            tag: tag.to_string(),
        });
    }

    pub fn extend(&mut self, other: ChangeSet) {
        self.mutations.extend(other.mutations);
    }

    /// Apply every mutation to `root` in order.
    ///
    /// Leaf mutations fail with [`ReconcileError::StructuralPrecondition`]
    /// when the block does not exist; mutations before the failing one have
    /// already been applied, so callers apply plans to a scratch copy first.
    pub fn apply(&self, root: &mut ConfigNode) -> Result<()> {
        for mutation in &self.mutations {
            match mutation {
                Mutation::CreateBlock => {
                    root.ensure_child(HASYNC);
                }
                Mutation::SetText { tag, value } => {
                    ha_block_mut(root)?.set_child_text(tag, value);
                }
                Mutation::Remove { tag } => {
                    ha_block_mut(root)?.remove_children(tag);
                }
            }
        }
        Ok(())
    }
}

/// Return the HA block of `root` or a structural error.
pub fn ha_block(root: &ConfigNode) -> Result<&ConfigNode> {
    root.get_child(HASYNC).ok_or_else(missing_block)
}

fn ha_block_mut(root: &mut ConfigNode) -> Result<&mut ConfigNode> {
    root.child_mut(HASYNC).ok_or_else(missing_block)
}

fn missing_block() -> ReconcileError {
    ReconcileError::StructuralPrecondition(format!("<{HASYNC}> block does not exist"))
}
