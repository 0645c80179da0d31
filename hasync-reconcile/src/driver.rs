//! One reconciliation run against one configuration session.
//!
//! Steps run in a fixed order: bootstrap, remote sync target and credentials,
//! pfsync states, preemption and PPP flags, pfsync interface, peer address,
//! service flags. Each step plans against a scratch copy of the record that
//! already carries the previous steps, so later steps see the bootstrapped
//! block. The session itself is only touched once every step has planned
//! successfully; any resolution or lookup error leaves it untouched.

use config_tree::{Change, ConfigNode};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::allowlist::AllowList;
use crate::apply::{CommandOutcome, SettingsApplier};
use crate::bootstrap::plan_bootstrap;
use crate::declaration::HaDeclaration;
use crate::error::{ReconcileError, Result};
use crate::fields::{
    ScalarIntent, DISABLE_PREEMPT, DISCONNECT_PPPS, HASYNC, PASSWORD, PFSYNC_ENABLED,
};
use crate::flags::plan_service_flags;
use crate::plan::ChangeSet;
use crate::query::{interface_allow_list, HostQuery};
use crate::scalar::{plan_interface, plan_peer_ip, plan_presence, plan_remote_sync};
use crate::session::ConfigSession;

/// Shown instead of password values in every diff.
pub const MASK: &str = "********";

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Interface token used when the block has to be created.
    pub default_interface: String,
    /// Tag prefix of service flags.
    pub flag_prefix: String,
    /// Report the diff without saving or applying.
    pub dry_run: bool,
}

/// Where a run ended up. Only `Committed` touched the running system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Bootstrapped,
    Reconciled,
    Committed,
    DryRunReported,
    NoOpReported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub changed: bool,
    pub state: RunState,
    pub diff: Option<Vec<Change>>,
    pub applied: Option<Vec<CommandOutcome>>,
}

/// Allow-lists fetched at most once per run, and only when a step needs them.
struct AllowLists<'a> {
    query: &'a dyn HostQuery,
    interfaces: Option<AllowList>,
    services: Option<AllowList>,
}

impl<'a> AllowLists<'a> {
    fn new(query: &'a dyn HostQuery) -> Self {
        Self {
            query,
            interfaces: None,
            services: None,
        }
    }

    fn interfaces(&mut self) -> Result<&AllowList> {
        if self.interfaces.is_none() {
            self.interfaces = Some(interface_allow_list(self.query)?);
        }
        self.interfaces
            .as_ref()
            .ok_or_else(|| unreachable_lookup("interfaces"))
    }

    fn services(&mut self) -> Result<&AllowList> {
        if self.services.is_none() {
            self.services = Some(self.query.list_sync_services()?);
        }
        self.services
            .as_ref()
            .ok_or_else(|| unreachable_lookup("sync services"))
    }
}

fn unreachable_lookup(query: &str) -> ReconcileError {
    ReconcileError::LookupFailed {
        query: query.to_string(),
        reason: "allow-list was not cached".to_string(),
    }
}

/// Accumulates step plans while keeping a scratch tree in step with them.
struct Staging {
    scratch: ConfigNode,
    plan: ChangeSet,
}

impl Staging {
    fn root(&self) -> &ConfigNode {
        &self.scratch
    }

    fn stage(&mut self, step: &str, plan: ChangeSet) -> Result<()> {
        debug!(step, mutations = plan.len(), "step planned");
        plan.apply(&mut self.scratch)?;
        self.plan.extend(plan);
        Ok(())
    }
}

/// Reconcile the HA block of `session` with `decl`.
///
/// The session is consumed: it is saved when the run commits and dropped
/// unsaved on every other path.
pub fn reconcile(
    mut session: ConfigSession,
    decl: &HaDeclaration,
    query: &dyn HostQuery,
    applier: &dyn SettingsApplier,
    opts: &ReconcileOptions,
) -> Result<ReconcileOutcome> {
    let span = info_span!(
        "reconcile",
        path = %session.path().display(),
        context = %session.context(),
        dry_run = opts.dry_run
    );
    let _guard = span.enter();

    let mut state = RunState::Idle;
    let mut lists = AllowLists::new(query);
    let mut staging = Staging {
        scratch: session.root().clone(),
        plan: ChangeSet::default(),
    };

    if !staging.root().has_child(HASYNC) {
        if decl.synchronize_interface.is_none() {
            return Err(ReconcileError::MissingParameter(format!(
                "synchronize_interface is required while <{HASYNC}> does not exist"
            )));
        }
        let bootstrap = plan_bootstrap(
            staging.root(),
            &opts.default_interface,
            lists.interfaces()?,
        )?;
        staging.stage("bootstrap", bootstrap)?;
    }
    advance(&mut state, RunState::Bootstrapped);

    let remote = plan_remote_sync(
        staging.root(),
        &ScalarIntent::from_declared(decl.synchronize_config_to_ip.as_deref()),
        &ScalarIntent::from_declared(decl.remote_system_username.as_deref()),
        &ScalarIntent::from_declared(decl.remote_system_password.as_deref()),
    )?;
    staging.stage("remote_sync", remote)?;

    for (step, tag, desired) in [
        ("states", PFSYNC_ENABLED, decl.synchronize_states),
        ("disable_preempt", DISABLE_PREEMPT, decl.disable_preempt),
        ("disconnect_ppps", DISCONNECT_PPPS, decl.disconnect_ppps),
    ] {
        let plan = plan_presence(staging.root(), tag, desired)?;
        staging.stage(step, plan)?;
    }

    if let Some(token) = decl.synchronize_interface.as_deref() {
        let plan = plan_interface(staging.root(), Some(token), lists.interfaces()?)?;
        staging.stage("interface", plan)?;
    }

    let peer = plan_peer_ip(
        staging.root(),
        &ScalarIntent::from_declared(decl.synchronize_peer_ip.as_deref()),
    )?;
    staging.stage("peer_ip", peer)?;

    if let Some(services) = decl.services_to_synchronize.as_deref() {
        let plan = plan_service_flags(
            staging.root(),
            services,
            lists.services()?,
            &opts.flag_prefix,
        )?;
        staging.stage("services", plan)?;
    }
    advance(&mut state, RunState::Reconciled);

    session.apply_plan(&staging.plan)?;

    if !session.changed() {
        advance(&mut state, RunState::NoOpReported);
        return Ok(ReconcileOutcome {
            changed: false,
            state,
            diff: None,
            applied: None,
        });
    }

    let diff: Vec<Change> = session
        .diff()
        .into_iter()
        .map(|change| change.masked(is_secret_path, MASK))
        .collect();
    info!(changes = diff.len(), "HA block differs from declaration");

    if opts.dry_run {
        advance(&mut state, RunState::DryRunReported);
        return Ok(ReconcileOutcome {
            changed: true,
            state,
            diff: Some(diff),
            applied: None,
        });
    }

    session.save()?;
    let outcomes = applier.apply();
    if let Some(failed) = outcomes.iter().find(|outcome| !outcome.succeeded()) {
        warn!(command = %failed.command, status = failed.status, "apply failed after save");
        return Err(ReconcileError::ApplyFailed {
            command: failed.command.clone(),
            status: failed.status,
            stdout: failed.stdout.clone(),
            stderr: failed.stderr.clone(),
        });
    }
    advance(&mut state, RunState::Committed);

    Ok(ReconcileOutcome {
        changed: true,
        state,
        diff: Some(diff),
        applied: Some(outcomes),
    })
}

fn advance(state: &mut RunState, next: RunState) {
    debug!(from = ?state, to = ?next, "run state");
    *state = next;
}

fn is_secret_path(path: &str) -> bool {
    path.rsplit('.').next() == Some(PASSWORD)
}
