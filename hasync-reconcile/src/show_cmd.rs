use anyhow::{Context, Result};
use config_tree::parse_file;
use hasync_reconcile::query::HostQuery;
use hasync_reconcile::report::render_view;
use hasync_reconcile::view::build_view;

use crate::cli::{OutputFormat, ShowArgs};
use crate::resolve_settings;

pub fn run_show(args: ShowArgs) -> Result<()> {
    let settings = resolve_settings(args.settings.as_deref())?;
    let config_path = args.config.unwrap_or_else(|| settings.config_path.clone());
    let root = parse_file(&config_path)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;

    let services = if args.describe {
        Some(settings.host_query().list_sync_services()?)
    } else {
        None
    };
    let view = build_view(&root, &settings.flag_prefix, services.as_ref());

    match args.format {
        OutputFormat::Text => println!("{}", render_view(&view)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }
    Ok(())
}
