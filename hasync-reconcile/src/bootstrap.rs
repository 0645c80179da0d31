//! Creation of the HA block on first use.

use config_tree::ConfigNode;
use tracing::info;

use crate::allowlist::AllowList;
use crate::error::Result;
use crate::fields::{HASYNC, PFSYNC_INTERFACE};
use crate::plan::{ChangeSet, Mutation};

/// Plan creation of the HA block when `root` does not have one yet.
///
/// A fresh OPNsense install has no `<hasync>` at all. The new block gets the
/// default interface (resolved like any declared token) and nothing else, so
/// the remote sync target and its credentials start out absent. An existing
/// block is never touched.
pub fn plan_bootstrap(
    root: &ConfigNode,
    default_interface: &str,
    interfaces: &AllowList,
) -> Result<ChangeSet> {
    if root.has_child(HASYNC) {
        return Ok(ChangeSet::default());
    }

    let interface = interfaces.resolve(default_interface)?;
    info!(interface = %interface, "creating <{HASYNC}> block");

    let mut plan = ChangeSet {
        mutations: vec![Mutation::CreateBlock],
    };
    plan.set(PFSYNC_INTERFACE, &interface);
    Ok(plan)
}
