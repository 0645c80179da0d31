//! Service synchronization flags.
//!
//! Each synchronizable service is a presence leaf named `<prefix><id>`, for
//! example `synchronizealiases`. Reconciliation converges the flags whose
//! identifiers are in the live service list to exactly the declared set.
//! Flags for services the host no longer offers are never removed here: a
//! plugin that is temporarily uninstalled keeps its setting.

use config_tree::ConfigNode;
use tracing::{debug, info};

use crate::allowlist::AllowList;
use crate::error::Result;
use crate::fields::{Presence, NAMED_FIELDS, ON};
use crate::plan::{ha_block, ChangeSet};

/// Tag of the flag for service `id`.
pub fn flag_tag(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}")
}

/// Identifiers of every flag currently switched on in `block`, in document
/// order, including flags for services the host does not list.
pub fn enabled_flags(block: &ConfigNode, prefix: &str) -> Vec<String> {
    block
        .children
        .iter()
        .filter(|child| !NAMED_FIELDS.contains(&child.tag.as_str()))
        .filter(|child| child.text.as_deref().map(str::trim) == Some(ON))
        .filter_map(|child| child.tag.strip_prefix(prefix))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Plan the additions and removals that make the flags match `desired`.
///
/// Every token is resolved before anything is planned; all unknown tokens are
/// reported together and no mutation is produced.
pub fn plan_service_flags<S: AsRef<str>>(
    root: &ConfigNode,
    desired: &[S],
    services: &AllowList,
    prefix: &str,
) -> Result<ChangeSet> {
    let block = ha_block(root)?;
    let wanted = services.resolve_all(desired)?;
    let mut plan = ChangeSet::default();

    for id in &wanted {
        let tag = flag_tag(prefix, id);
        if NAMED_FIELDS.contains(&tag.as_str()) {
            continue;
        }
        if !Presence::read(block, &tag).is_on() {
            info!(service = %id, "enabling sync flag");
            plan.set(&tag, ON);
        }
    }

    for entry in &services.entries {
        if wanted.contains(&entry.id) {
            continue;
        }
        let tag = flag_tag(prefix, &entry.id);
        if NAMED_FIELDS.contains(&tag.as_str()) {
            continue;
        }
        if Presence::read(block, &tag).exists() {
            info!(service = %entry.id, "disabling sync flag");
            plan.remove(&tag);
        }
    }

    debug!(
        desired = wanted.len(),
        mutations = plan.len(),
        "service flags planned"
    );
    Ok(plan)
}
