//! Reconcile OPNsense high-availability settings in `config.xml`.
//!
//! The `<hasync>` block holds pfsync state synchronization settings, the
//! remote system used for configuration sync, and one presence flag per
//! service whose configuration is pushed to the peer. Given a declared
//! desired state this crate computes the smallest set of mutations that makes
//! the block match, applies them in one transaction, and optionally saves the
//! record and runs the host's apply commands.
//!
//! # Architecture
//!
//! - [`allowlist`] / [`query`]: live interface and service lists from the host,
//!   and resolution of user tokens (identifier or description) against them
//! - [`plan`]: mutation plans ([`plan::ChangeSet`]) computed against a snapshot
//! - [`bootstrap`], [`scalar`], [`flags`]: the planners for each part of the block
//! - [`session`]: one transactional load of the record
//! - [`driver`]: runs the planners in order and commits, reports, or discards
//! - [`view`] / [`report`]: read-only rendering of the block and of run outcomes
//!
//! # Example
//!
//! ```ignore
//! use hasync_reconcile::declaration::HaDeclaration;
//! use hasync_reconcile::driver::{reconcile, ReconcileOptions};
//! use hasync_reconcile::session::ConfigSession;
//! use hasync_reconcile::settings::default_settings;
//!
//! let settings = default_settings()?;
//! let session = ConfigSession::open(&settings.config_path, &settings.context)?;
//! let decl = HaDeclaration {
//!     synchronize_interface: Some("sync".to_string()),
//!     synchronize_states: Some(true),
//!     ..HaDeclaration::default()
//! };
//! let opts = ReconcileOptions {
//!     default_interface: settings.default_interface.clone(),
//!     flag_prefix: settings.flag_prefix.clone(),
//!     dry_run: true,
//! };
//! let outcome = reconcile(session, &decl, &settings.host_query(), &settings.applier(), &opts)?;
//! println!("changed={}", outcome.changed);
//! ```

pub mod allowlist;
pub mod apply;
pub mod bootstrap;
pub mod declaration;
pub mod driver;
pub mod error;
pub mod fields;
pub mod flags;
pub mod plan;
pub mod query;
pub mod report;
pub mod scalar;
pub mod session;
pub mod settings;
pub mod view;
