//! Single-valued leaves of the HA block.
//!
//! Every planner reads the block from `root` and fails with a structural
//! error when it has not been bootstrapped. Plans only contain mutations
//! that change the record, which keeps repeated runs at `changed=false`.

use config_tree::ConfigNode;
use tracing::debug;

use crate::allowlist::AllowList;
use crate::error::Result;
use crate::fields::{
    Presence, ScalarIntent, ON, PASSWORD, PFSYNC_INTERFACE, PFSYNC_PEER_IP, SYNCHRONIZE_TO_IP,
    USERNAME,
};
use crate::plan::{ha_block, ChangeSet};

/// Plan a presence-typed boolean such as `pfsyncenabled`.
///
/// `None` leaves the leaf alone. `Some(true)` writes `on` unless it already
/// reads `on`; `Some(false)` removes the leaf if it exists in any form.
pub fn plan_presence(root: &ConfigNode, tag: &str, desired: Option<bool>) -> Result<ChangeSet> {
    let block = ha_block(root)?;
    let mut plan = ChangeSet::default();
    let current = Presence::read(block, tag);

    match desired {
        Some(true) if !current.is_on() => plan.set(tag, ON),
        Some(false) if current.exists() => plan.remove(tag),
        _ => {}
    }
    debug!(tag, ?current, ?desired, mutations = plan.len(), "presence leaf");
    Ok(plan)
}

/// Plan a free-text optional leaf.
pub fn plan_scalar(root: &ConfigNode, tag: &str, intent: &ScalarIntent) -> Result<ChangeSet> {
    let block = ha_block(root)?;
    let mut plan = ChangeSet::default();

    match intent {
        ScalarIntent::Keep => {}
        ScalarIntent::Clear => {
            if block.has_child(tag) {
                plan.remove(tag);
            }
        }
        ScalarIntent::Set(value) => {
            if block.get_text(&[tag]) != Some(value.as_str()) {
                plan.set(tag, value);
            }
        }
    }
    debug!(tag, mutations = plan.len(), "scalar leaf");
    Ok(plan)
}

/// Plan the remote configuration sync target and its credentials.
///
/// The three leaves are independent: each follows its own [`ScalarIntent`].
pub fn plan_remote_sync(
    root: &ConfigNode,
    target: &ScalarIntent,
    username: &ScalarIntent,
    password: &ScalarIntent,
) -> Result<ChangeSet> {
    let mut plan = plan_scalar(root, SYNCHRONIZE_TO_IP, target)?;
    plan.extend(plan_scalar(root, USERNAME, username)?);
    plan.extend(plan_scalar(root, PASSWORD, password)?);
    Ok(plan)
}

/// Plan the pfsync interface from a declared token.
///
/// The token is resolved against the live interface list and the canonical
/// identifier, never the description, is stored.
pub fn plan_interface(
    root: &ConfigNode,
    token: Option<&str>,
    interfaces: &AllowList,
) -> Result<ChangeSet> {
    let block = ha_block(root)?;
    let Some(token) = token else {
        return Ok(ChangeSet::default());
    };

    let interface = interfaces.resolve(token)?;
    let mut plan = ChangeSet::default();
    if block.get_text(&[PFSYNC_INTERFACE]) != Some(interface.as_str()) {
        plan.set(PFSYNC_INTERFACE, &interface);
    }
    Ok(plan)
}

/// Plan the pfsync peer address. A cleared peer means directed multicast.
pub fn plan_peer_ip(root: &ConfigNode, intent: &ScalarIntent) -> Result<ChangeSet> {
    plan_scalar(root, PFSYNC_PEER_IP, intent)
}
