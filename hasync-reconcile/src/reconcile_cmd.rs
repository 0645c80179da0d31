use anyhow::{bail, Context, Result};
use hasync_reconcile::declaration::{load_declaration, HaDeclaration};
use hasync_reconcile::driver::{reconcile, ReconcileOptions};
use hasync_reconcile::report::render_outcome;
use hasync_reconcile::session::ConfigSession;

use crate::cli::{OutputFormat, ReconcileArgs};
use crate::resolve_settings;

pub fn run_reconcile(args: ReconcileArgs) -> Result<()> {
    let settings = resolve_settings(args.settings.as_deref())?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| settings.config_path.clone());

    let base = match &args.declaration {
        Some(path) => load_declaration(path)?,
        None => HaDeclaration::default(),
    };
    let decl = base.merged_with(declaration_from_flags(&args));
    if decl.is_empty() {
        bail!("nothing to reconcile: declare at least one setting");
    }

    let session = ConfigSession::open(&config_path, &settings.context)
        .with_context(|| format!("failed to open {}", config_path.display()))?;
    let opts = ReconcileOptions {
        default_interface: settings.default_interface.clone(),
        flag_prefix: settings.flag_prefix.clone(),
        dry_run: args.check,
    };

    let outcome = reconcile(
        session,
        &decl,
        &settings.host_query(),
        &settings.applier(),
        &opts,
    )
    .with_context(|| format!("failed to reconcile {}", config_path.display()))?;

    match args.format {
        OutputFormat::Text => println!("{}", render_outcome(&outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

fn declaration_from_flags(args: &ReconcileArgs) -> HaDeclaration {
    let services = if args.no_services {
        Some(Vec::new())
    } else if args.services.is_empty() {
        None
    } else {
        Some(args.services.clone())
    };

    HaDeclaration {
        synchronize_states: args.synchronize_states,
        synchronize_interface: args.synchronize_interface.clone(),
        synchronize_peer_ip: args.synchronize_peer_ip.clone(),
        synchronize_config_to_ip: args.synchronize_config_to_ip.clone(),
        remote_system_username: args.remote_system_username.clone(),
        remote_system_password: args.remote_system_password.clone(),
        disable_preempt: args.disable_preempt,
        disconnect_ppps: args.disconnect_ppps,
        services_to_synchronize: services,
    }
}
