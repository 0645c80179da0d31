//! Pushing a saved record to the running firewall.

use std::process::Command;

use serde::Serialize;
use tracing::{debug, warn};

/// Result of one command run to push saved settings to the running system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }
}

/// Capability to apply a saved record to the running firewall.
pub trait SettingsApplier {
    /// Run every apply step and report each one, failed or not.
    fn apply(&self) -> Vec<CommandOutcome>;
}

/// [`SettingsApplier`] that runs a fixed list of host commands in order.
#[derive(Debug, Clone, Default)]
pub struct CommandApplier {
    pub commands: Vec<Vec<String>>,
}

impl SettingsApplier for CommandApplier {
    fn apply(&self) -> Vec<CommandOutcome> {
        self.commands.iter().map(|argv| run(argv)).collect()
    }
}

fn run(argv: &[String]) -> CommandOutcome {
    let command = argv.join(" ");
    let Some((program, args)) = argv.split_first() else {
        return CommandOutcome {
            command,
            status: -1,
            stdout: String::new(),
            stderr: "empty apply command".to_string(),
        };
    };

    debug!(command = %command, "running apply command");
    match Command::new(program).args(args).output() {
        Ok(output) => CommandOutcome {
            command,
            // Killed by a signal: no exit code.
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        },
        Err(err) => {
            warn!(command = %command, error = %err, "apply command could not be started");
            CommandOutcome {
                command,
                status: -1,
                stdout: String::new(),
                stderr: err.to_string(),
            }
        }
    }
}
