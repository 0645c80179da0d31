//! Tags of the `<hasync>` block and the encodings used by its leaves.

use config_tree::ConfigNode;

/// Tag of the HA block directly under the document root.
pub const HASYNC: &str = "hasync";

pub const PFSYNC_ENABLED: &str = "pfsyncenabled";
pub const PFSYNC_INTERFACE: &str = "pfsyncinterface";
pub const PFSYNC_PEER_IP: &str = "pfsyncpeerip";
pub const SYNCHRONIZE_TO_IP: &str = "synchronizetoip";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const DISABLE_PREEMPT: &str = "disablepreempt";
pub const DISCONNECT_PPPS: &str = "disconnectppps";

/// Text stored in every presence-typed leaf that is switched on.
pub const ON: &str = "on";

/// Named leaves of the block. None of them is ever a service flag, even
/// `synchronizetoip`, which shares the flag prefix.
pub const NAMED_FIELDS: &[&str] = &[
    PFSYNC_ENABLED,
    PFSYNC_INTERFACE,
    PFSYNC_PEER_IP,
    SYNCHRONIZE_TO_IP,
    USERNAME,
    PASSWORD,
    DISABLE_PREEMPT,
    DISCONNECT_PPPS,
];

/// How a presence-typed leaf currently reads.
///
/// The record only ever stores `on`; a leaf with any other text is kept apart
/// from a missing leaf so that "not configured" and "configured off" never
/// collapse into the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Absent,
    PresentOff,
    PresentOn,
}

impl Presence {
    /// Read the presence leaf `tag` from `block`.
    pub fn read(block: &ConfigNode, tag: &str) -> Presence {
        match block.get_child(tag) {
            None => Presence::Absent,
            Some(node) if node.text.as_deref().map(str::trim) == Some(ON) => Presence::PresentOn,
            Some(_) => Presence::PresentOff,
        }
    }

    pub fn is_on(self) -> bool {
        self == Presence::PresentOn
    }

    pub fn exists(self) -> bool {
        self != Presence::Absent
    }
}

/// What a declaration asks for a free-text optional leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarIntent {
    /// The field was not mentioned; leave it alone.
    Keep,
    /// The field was given as empty; remove the leaf.
    Clear,
    /// The field was given a value; overwrite the leaf.
    Set(String),
}

impl ScalarIntent {
    /// `None` is "not mentioned", a blank value is "explicitly empty". Any
    /// other value is kept exactly as declared, surrounding spaces included.
    pub fn from_declared(value: Option<&str>) -> ScalarIntent {
        match value {
            None => ScalarIntent::Keep,
            Some(value) if value.trim().is_empty() => ScalarIntent::Clear,
            Some(value) => ScalarIntent::Set(value.to_string()),
        }
    }
}
