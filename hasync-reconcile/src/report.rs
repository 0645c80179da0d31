use colored::Colorize;
use config_tree::{format_text, Change};

use crate::driver::{ReconcileOutcome, RunState};
use crate::view::HaView;

/// Render changes for terminal output.
pub fn render_changes(entries: &[Change]) -> String {
    let raw = format_text(entries);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render a run outcome: a summary line, the diff, then apply results.
pub fn render_outcome(outcome: &ReconcileOutcome) -> String {
    let state = match outcome.state {
        RunState::Committed => "committed",
        RunState::DryRunReported => "dry-run",
        RunState::NoOpReported => "no-op",
        RunState::Idle | RunState::Bootstrapped | RunState::Reconciled => "incomplete",
    };
    let mut out = vec![format!("changed={} state={state}", outcome.changed)
        .cyan()
        .to_string()];

    if let Some(diff) = outcome.diff.as_deref().filter(|diff| !diff.is_empty()) {
        out.push(render_changes(diff));
    }

    for result in outcome.applied.iter().flatten() {
        out.push(format!("apply `{}` status={}", result.command, result.status));
        if !result.stdout.is_empty() {
            out.push(format!("  {}", result.stdout));
        }
    }

    out.join("\n")
}

/// Render the HA block view as aligned `key: value` lines.
pub fn render_view(view: &HaView) -> String {
    if !view.exists {
        return "hasync block not configured".yellow().to_string();
    }

    let opt = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let mut out = vec![
        format!("synchronize_states:       {}", view.synchronize_states),
        format!("synchronize_interface:    {}", opt(&view.synchronize_interface)),
        format!("synchronize_peer_ip:      {}", opt(&view.synchronize_peer_ip)),
        format!("synchronize_config_to_ip: {}", opt(&view.synchronize_config_to_ip)),
        format!("remote_system_username:   {}", opt(&view.remote_system_username)),
        format!(
            "remote_system_password:   {}",
            if view.remote_system_password_set { "(set)" } else { "-" }
        ),
        format!("disable_preempt:          {}", view.disable_preempt),
        format!("disconnect_ppps:          {}", view.disconnect_ppps),
        "services_to_synchronize:".to_string(),
    ];
    for service in &view.services {
        match &service.description {
            Some(description) => out.push(format!("  - {} ({description})", service.id)),
            None => out.push(format!("  - {} {}", service.id, "(not offered by host)".dimmed())),
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use config_tree::Change;

    use super::{render_changes, render_outcome};
    use crate::driver::{ReconcileOutcome, RunState};

    #[test]
    fn outcome_lists_state_and_changes() {
        colored::control::set_override(false);
        let outcome = ReconcileOutcome {
            changed: true,
            state: RunState::DryRunReported,
            diff: Some(vec![Change::Added {
                path: "hasync.pfsyncenabled".to_string(),
                value: Some("on".to_string()),
            }]),
            applied: None,
        };

        let text = render_outcome(&outcome);
        assert!(text.starts_with("changed=true state=dry-run"));
        assert!(text.contains("+ hasync.pfsyncenabled = on"));
        assert_eq!(render_changes(&[]), "");
    }
}
