use std::fmt::{self, Display, Formatter};

use config_tree::{ParseError, WriteError};
use serde::Serialize;
use thiserror::Error;

/// Which allow-list a token was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Interface,
    Service,
}

impl Display for IdentifierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Interface => write!(f, "interface"),
            IdentifierKind::Service => write!(f, "service"),
        }
    }
}

/// Errors raised by a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A step that edits the HA block ran before the block existed.
    #[error("structural precondition failed: {0}")]
    StructuralPrecondition(String),

    /// One or more tokens matched no allow-list entry.
    #[error(
        "unknown {kind}(s) {}; valid values are: {}",
        quoted(.tokens),
        .available.join(", ")
    )]
    UnresolvedIdentifier {
        kind: IdentifierKind,
        tokens: Vec<String>,
        available: Vec<String>,
    },

    /// A token matched more than one allow-list entry.
    #[error("{kind} '{token}' is ambiguous, it matches: {}", .candidates.join(", "))]
    AmbiguousIdentifier {
        kind: IdentifierKind,
        token: String,
        candidates: Vec<String>,
    },

    /// The live allow-list query itself failed.
    #[error("failed to list {query}: {reason}")]
    LookupFailed { query: String, reason: String },

    /// A committed change could not be applied to the running system.
    #[error("apply of HA settings failed: `{command}` exited with status {status}: {stderr}")]
    ApplyFailed {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    /// A declared parameter is required in the current record state.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

fn quoted(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| format!("'{t}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
