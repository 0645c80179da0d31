//! Read-only host queries that produce the interface and service allow-lists.

use std::process::Command;

use serde_json::Value;
use tracing::debug;

use crate::allowlist::AllowList;
use crate::error::{IdentifierKind, ReconcileError, Result};

/// Capability to list what the running firewall currently offers.
///
/// Both lists can change between runs as interfaces are assigned and plugins
/// are installed, so callers must query them on every reconciliation.
pub trait HostQuery {
    /// Configured interfaces as `identifier → description`.
    fn list_interfaces(&self) -> Result<AllowList>;
    /// Services eligible for configuration synchronization.
    fn list_sync_services(&self) -> Result<AllowList>;
}

/// Fetch the interface allow-list with the loopback pseudo-entry added.
pub fn interface_allow_list(query: &dyn HostQuery) -> Result<AllowList> {
    Ok(query.list_interfaces()?.with_loopback())
}

/// [`HostQuery`] that runs one host command per list.
///
/// Each command must print a JSON object on stdout whose keys are canonical
/// identifiers and whose values are either the description string or an
/// object carrying a `description` field.
#[derive(Debug, Clone)]
pub struct CommandQuery {
    pub interfaces: Vec<String>,
    pub services: Vec<String>,
}

impl HostQuery for CommandQuery {
    fn list_interfaces(&self) -> Result<AllowList> {
        run_list_command("interfaces", IdentifierKind::Interface, &self.interfaces)
    }

    fn list_sync_services(&self) -> Result<AllowList> {
        run_list_command("sync services", IdentifierKind::Service, &self.services)
    }
}

fn run_list_command(name: &str, kind: IdentifierKind, argv: &[String]) -> Result<AllowList> {
    let lookup_failed = |reason: String| ReconcileError::LookupFailed {
        query: name.to_string(),
        reason,
    };

    let (program, args) = argv
        .split_first()
        .ok_or_else(|| lookup_failed("no command configured".to_string()))?;
    debug!(query = name, command = %argv.join(" "), "querying host");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| lookup_failed(format!("could not run {program}: {err}")))?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        return Err(lookup_failed(format!(
            "{program} exited with {}: {stderr}",
            output.status
        )));
    }
    if !stderr.is_empty() {
        return Err(lookup_failed(format!("{program} reported: {stderr}")));
    }

    let list = parse_listing(kind, &output.stdout).map_err(lookup_failed)?;
    debug!(query = name, entries = list.entries.len(), "host query finished");
    Ok(list)
}

/// Parse a JSON `{identifier: description}` listing, keeping the host's order.
pub fn parse_listing(kind: IdentifierKind, raw: &[u8]) -> Result<AllowList, String> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|err| format!("output is not JSON: {err}"))?;
    let Value::Object(map) = value else {
        return Err("output is not a JSON object".to_string());
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (id, entry) in map {
        let description = match entry {
            Value::String(text) => text,
            Value::Object(fields) => match fields.get("description").or(fields.get("descr")) {
                Some(Value::String(text)) => text.clone(),
                _ => id.clone(),
            },
            _ => return Err(format!("entry '{id}' has no usable description")),
        };
        pairs.push((id, description));
    }

    if pairs.is_empty() {
        return Err("query returned no entries".to_string());
    }
    Ok(AllowList::new(kind, pairs))
}

#[cfg(test)]
mod tests {
    use super::{parse_listing, CommandQuery, HostQuery};
    use crate::error::{IdentifierKind, ReconcileError};

    #[test]
    fn parses_plain_and_structured_entries() {
        let list = parse_listing(
            IdentifierKind::Service,
            br#"{"aliases": "Aliases", "certs": {"description": "Certificates", "section": "cert"}}"#,
        )
        .expect("parse");
        assert_eq!(list.description("aliases"), Some("Aliases"));
        assert_eq!(list.description("certs"), Some("Certificates"));
    }

    #[test]
    fn listing_keeps_host_order() {
        let list = parse_listing(
            IdentifierKind::Service,
            br#"{"widgets": "Dashboard", "aliases": "Aliases", "nat": "NAT"}"#,
        )
        .expect("parse");
        assert_eq!(list.descriptions(), vec!["Dashboard", "Aliases", "NAT"]);
    }

    #[test]
    fn empty_listing_is_an_error() {
        let err = parse_listing(IdentifierKind::Interface, b"{}").expect_err("empty");
        assert!(err.contains("no entries"));
    }

    #[test]
    fn command_output_becomes_allow_list() {
        let query = CommandQuery {
            interfaces: vec!["echo".to_string(), r#"{"lan": "LAN"}"#.to_string()],
            services: vec![],
        };
        let list = query.list_interfaces().expect("echo should succeed");
        assert_eq!(list.resolve("LAN").expect("resolve"), "lan");
    }

    #[test]
    fn failing_command_is_a_lookup_error() {
        let query = CommandQuery {
            interfaces: vec![],
            services: vec!["false".to_string()],
        };
        assert!(matches!(
            query.list_sync_services(),
            Err(ReconcileError::LookupFailed { .. })
        ));
        assert!(matches!(
            query.list_interfaces(),
            Err(ReconcileError::LookupFailed { .. })
        ));
    }
}
