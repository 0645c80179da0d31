//! Declared desired state of the HA block.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Desired HA settings. `None` always means "not mentioned in this run".
///
/// For the free-text fields an empty string is different from `None`: it asks
/// for the leaf to be removed. `services` set to `Some(vec![])` disables every
/// listed service, while `None` leaves the flags alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HaDeclaration {
    pub synchronize_states: Option<bool>,
    pub synchronize_interface: Option<String>,
    pub synchronize_peer_ip: Option<String>,
    pub synchronize_config_to_ip: Option<String>,
    pub remote_system_username: Option<String>,
    pub remote_system_password: Option<String>,
    pub disable_preempt: Option<bool>,
    pub disconnect_ppps: Option<bool>,
    pub services_to_synchronize: Option<Vec<String>>,
}

impl HaDeclaration {
    /// Overlay every field `other` mentions on top of `self`.
    pub fn merged_with(mut self, other: HaDeclaration) -> HaDeclaration {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.synchronize_states, other.synchronize_states);
        take(&mut self.synchronize_interface, other.synchronize_interface);
        take(&mut self.synchronize_peer_ip, other.synchronize_peer_ip);
        take(
            &mut self.synchronize_config_to_ip,
            other.synchronize_config_to_ip,
        );
        take(
            &mut self.remote_system_username,
            other.remote_system_username,
        );
        take(
            &mut self.remote_system_password,
            other.remote_system_password,
        );
        take(&mut self.disable_preempt, other.disable_preempt);
        take(&mut self.disconnect_ppps, other.disconnect_ppps);
        take(
            &mut self.services_to_synchronize,
            other.services_to_synchronize,
        );
        self
    }

    /// `true` when no field is mentioned at all.
    pub fn is_empty(&self) -> bool {
        *self == HaDeclaration::default()
    }
}

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("failed to read declaration {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse declaration {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to parse declaration {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Load a declaration from a `.json` file, or TOML for any other extension.
pub fn load_declaration(path: &Path) -> Result<HaDeclaration, DeclarationError> {
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| DeclarationError::Io {
        path: display.clone(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&raw).map_err(|source| DeclarationError::Json {
            path: display,
            source,
        })
    } else {
        toml::from_str(&raw).map_err(|source| DeclarationError::Toml {
            path: display,
            source,
        })
    }
}
