use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "hasync-reconcile")]
#[command(about = "Reconcile OPNsense high-availability settings in config.xml")]
pub struct Cli {
    /// Log every reconciliation step to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Converge the hasync block to the declared settings.
    Reconcile(ReconcileArgs),
    /// Print the current hasync block.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct ReconcileArgs {
    /// Runtime settings file (defaults to the embedded OPNsense settings).
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Override the config.xml path from the settings.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// TOML or JSON declaration; flags below override its fields.
    #[arg(long)]
    pub declaration: Option<PathBuf>,
    /// Enable or disable pfsync state synchronization.
    #[arg(long)]
    pub synchronize_states: Option<bool>,
    /// Interface used for pfsync, by identifier or description.
    #[arg(long)]
    pub synchronize_interface: Option<String>,
    /// Unicast pfsync peer. An empty value restores multicast.
    #[arg(long)]
    pub synchronize_peer_ip: Option<String>,
    /// Peer that receives configuration sync. An empty value clears it.
    #[arg(long)]
    pub synchronize_config_to_ip: Option<String>,
    /// Web GUI user on the peer. An empty value clears it.
    #[arg(long)]
    pub remote_system_username: Option<String>,
    /// Web GUI password on the peer. An empty value clears it.
    #[arg(long)]
    pub remote_system_password: Option<String>,
    /// Disable CARP preemption.
    #[arg(long)]
    pub disable_preempt: Option<bool>,
    /// Disconnect PPP links on the backup node.
    #[arg(long)]
    pub disconnect_ppps: Option<bool>,
    /// Service to synchronize, by identifier or description. Repeatable.
    #[arg(long = "service")]
    pub services: Vec<String>,
    /// Disable synchronization of every service the host lists.
    #[arg(long, conflicts_with = "services")]
    pub no_services: bool,
    /// Report the diff without saving or applying.
    #[arg(long)]
    pub check: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    #[arg(long)]
    pub settings: Option<PathBuf>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Query the host for service descriptions.
    #[arg(long)]
    pub describe: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
