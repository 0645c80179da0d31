//! Read-only view of the HA block for `show`.

use config_tree::ConfigNode;
use serde::Serialize;

use crate::allowlist::AllowList;
use crate::fields::{
    Presence, DISABLE_PREEMPT, DISCONNECT_PPPS, HASYNC, PASSWORD, PFSYNC_ENABLED,
    PFSYNC_INTERFACE, PFSYNC_PEER_IP, SYNCHRONIZE_TO_IP, USERNAME,
};
use crate::flags::enabled_flags;

/// Read-only summary of the HA block. The password is never carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaView {
    pub exists: bool,
    pub synchronize_states: bool,
    pub synchronize_interface: Option<String>,
    pub synchronize_peer_ip: Option<String>,
    pub synchronize_config_to_ip: Option<String>,
    pub remote_system_username: Option<String>,
    pub remote_system_password_set: bool,
    pub disable_preempt: bool,
    pub disconnect_ppps: bool,
    pub services: Vec<ServiceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceView {
    pub id: String,
    /// `None` when the host no longer lists the service.
    pub description: Option<String>,
}

/// Build the view of `root`. With `services`, flags get their descriptions.
pub fn build_view(root: &ConfigNode, flag_prefix: &str, services: Option<&AllowList>) -> HaView {
    let Some(block) = root.get_child(HASYNC) else {
        return HaView {
            exists: false,
            synchronize_states: false,
            synchronize_interface: None,
            synchronize_peer_ip: None,
            synchronize_config_to_ip: None,
            remote_system_username: None,
            remote_system_password_set: false,
            disable_preempt: false,
            disconnect_ppps: false,
            services: Vec::new(),
        };
    };

    let text = |tag: &str| {
        block
            .get_text(&[tag])
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    HaView {
        exists: true,
        synchronize_states: Presence::read(block, PFSYNC_ENABLED).is_on(),
        synchronize_interface: text(PFSYNC_INTERFACE),
        synchronize_peer_ip: text(PFSYNC_PEER_IP),
        synchronize_config_to_ip: text(SYNCHRONIZE_TO_IP),
        remote_system_username: text(USERNAME),
        remote_system_password_set: text(PASSWORD).is_some(),
        disable_preempt: Presence::read(block, DISABLE_PREEMPT).is_on(),
        disconnect_ppps: Presence::read(block, DISCONNECT_PPPS).is_on(),
        services: enabled_flags(block, flag_prefix)
            .into_iter()
            .map(|id| ServiceView {
                description: services
                    .and_then(|list| list.description(&id))
                    .map(str::to_string),
                id,
            })
            .collect(),
    }
}
