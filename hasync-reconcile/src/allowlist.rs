//! Live allow-lists and resolution of user tokens against them.
//!
//! A token resolves when it equals, ignoring ASCII case, either the canonical
//! identifier of exactly one entry or that entry's description. No prefix or
//! fuzzy matching is attempted.

use serde::Serialize;

use crate::error::{IdentifierKind, ReconcileError, Result};

/// Identifier of the loopback pseudo-interface, always offered for pfsync.
pub const LOOPBACK_ID: &str = "lo0";
pub const LOOPBACK_DESCR: &str = "Loopback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowEntry {
    pub id: String,
    pub description: String,
}

/// An ordered identifier → description mapping fetched from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowList {
    pub kind: IdentifierKind,
    pub entries: Vec<AllowEntry>,
}

impl AllowList {
    pub fn new<I, K, V>(kind: IdentifierKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(id, description)| AllowEntry {
                id: id.into(),
                description: description.into(),
            })
            .collect();
        Self { kind, entries }
    }

    /// Append the loopback pseudo-interface unless the host already listed it.
    pub fn with_loopback(mut self) -> Self {
        if !self.contains(LOOPBACK_ID) {
            self.entries.push(AllowEntry {
                id: LOOPBACK_ID.to_string(),
                description: LOOPBACK_DESCR.to_string(),
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn description(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.description.as_str())
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.description.clone())
            .collect()
    }

    /// Resolve one token to its canonical identifier.
    pub fn resolve(&self, token: &str) -> Result<String> {
        match self.lookup(token)? {
            Some(id) => Ok(id),
            None => Err(ReconcileError::UnresolvedIdentifier {
                kind: self.kind,
                tokens: vec![token.to_string()],
                available: self.descriptions(),
            }),
        }
    }

    /// Resolve every token, reporting all unknown ones in a single error.
    ///
    /// The result is deduplicated and keeps the order of first appearance.
    pub fn resolve_all<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        let mut resolved: Vec<String> = Vec::new();
        let mut unknown = Vec::new();
        for token in tokens {
            match self.lookup(token.as_ref())? {
                Some(id) => {
                    if !resolved.contains(&id) {
                        resolved.push(id);
                    }
                }
                None => unknown.push(token.as_ref().to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(ReconcileError::UnresolvedIdentifier {
                kind: self.kind,
                tokens: unknown,
                available: self.descriptions(),
            });
        }
        Ok(resolved)
    }

    /// `Ok(None)` when nothing matches, an error when several entries do.
    fn lookup(&self, token: &str) -> Result<Option<String>> {
        let needle = token.trim();
        let matches: Vec<&AllowEntry> = self
            .entries
            .iter()
            .filter(|entry| {
                entry.id.eq_ignore_ascii_case(needle)
                    || entry.description.eq_ignore_ascii_case(needle)
            })
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only.id.clone())),
            many => Err(ReconcileError::AmbiguousIdentifier {
                kind: self.kind,
                token: token.to_string(),
                candidates: many.iter().map(|entry| entry.id.clone()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AllowList, LOOPBACK_ID};
    use crate::error::{IdentifierKind, ReconcileError};

    fn services() -> AllowList {
        AllowList::new(
            IdentifierKind::Service,
            [
                ("aliases", "Aliases"),
                ("certs", "Certificates"),
                ("widgets", "Dashboard"),
            ],
        )
    }

    #[test]
    fn resolves_by_identifier_or_description_ignoring_case() {
        let list = services();
        assert_eq!(list.resolve("certs").expect("id"), "certs");
        assert_eq!(list.resolve("certificates").expect("descr"), "certs");
        assert_eq!(list.resolve("DASHBOARD").expect("descr"), "widgets");
    }

    #[test]
    fn unknown_token_reports_available_descriptions() {
        let err = services().resolve("Cert").expect_err("no prefix matching");
        match err {
            ReconcileError::UnresolvedIdentifier {
                kind,
                tokens,
                available,
            } => {
                assert_eq!(kind, IdentifierKind::Service);
                assert_eq!(tokens, vec!["Cert".to_string()]);
                assert_eq!(available, vec!["Aliases", "Certificates", "Dashboard"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolve_all_batches_every_unknown_token() {
        let err = services()
            .resolve_all(&["Aliases", "bababooey", "NonexistentService"])
            .expect_err("should fail");
        match err {
            ReconcileError::UnresolvedIdentifier { tokens, .. } => {
                assert_eq!(tokens, vec!["bababooey", "NonexistentService"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolve_all_deduplicates_id_and_description_of_same_entry() {
        let ids = services()
            .resolve_all(&["aliases", "Aliases", "Dashboard"])
            .expect("resolve");
        assert_eq!(ids, vec!["aliases", "widgets"]);
    }

    #[test]
    fn token_matching_two_entries_is_ambiguous() {
        let list = AllowList::new(
            IdentifierKind::Interface,
            [("lan", "LAN"), ("opt1", "lan")],
        );
        let err = list.resolve("lan").expect_err("ambiguous");
        assert!(matches!(err, ReconcileError::AmbiguousIdentifier { .. }));
    }

    #[test]
    fn loopback_is_injected_once() {
        let list = AllowList::new(IdentifierKind::Interface, [("lan", "LAN")])
            .with_loopback()
            .with_loopback();
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.resolve("loopback").expect("loopback"), LOOPBACK_ID);
    }
}
