//! Runtime settings for the record path and the host commands.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::apply::CommandApplier;
use crate::query::CommandQuery;

/// Runtime settings: where the record lives and how to talk to the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub config_path: PathBuf,
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default = "default_interface")]
    pub default_interface: String,
    #[serde(default = "default_flag_prefix")]
    pub flag_prefix: String,
    pub queries: QuerySettings,
    #[serde(default)]
    pub apply: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySettings {
    pub interfaces: Vec<String>,
    pub services: Vec<String>,
}

fn default_context() -> String {
    "system_high_availability_settings".to_string()
}

fn default_interface() -> String {
    "lan".to_string()
}

fn default_flag_prefix() -> String {
    "synchronize".to_string()
}

impl Settings {
    pub fn host_query(&self) -> CommandQuery {
        CommandQuery {
            interfaces: self.queries.interfaces.clone(),
            services: self.queries.services.clone(),
        }
    }

    pub fn applier(&self) -> CommandApplier {
        CommandApplier {
            commands: self.apply.clone(),
        }
    }
}

/// Errors returned when loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_settings(&raw, path.display().to_string())
}

/// Settings for a stock OPNsense host, compiled into the binary.
pub fn default_settings() -> Result<Settings, SettingsError> {
    let embedded = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/defaults/settings.toml"
    ));
    parse_settings(embedded, "embedded settings".to_string())
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })
}
