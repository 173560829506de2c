//! Text rendering of the dashboard and dialogs.

use std::fmt::Write as _;

use obligation_client::{DashboardState, DialogHost, MessageModal};
use shared::domain::ObligationRecord;

/// Prints message dialogs to stdout. The terminal has no dismiss button,
/// so a dialog is dismissed as soon as it has been shown.
pub struct TerminalDialogs;

impl DialogHost for TerminalDialogs {
    fn open_message(&self, mut modal: MessageModal) {
        println!("{}", render_message(&modal));
        modal.dismiss();
    }
}

pub fn render_message(modal: &MessageModal) -> String {
    match modal.status() {
        Some(status) if modal.payload().is_success() => {
            format!("[{status}] {}", modal.message())
        }
        Some(status) => format!("[{status} error] {}", modal.message()),
        None => format!("[no response] {}", modal.message()),
    }
}

pub fn render_records(title: &str, records: &[ObligationRecord]) -> String {
    let mut out = format!("{title} ({})\n", records.len());
    if records.is_empty() {
        out.push_str("  (none)\n");
    }
    for record in records {
        let _ = writeln!(out, "  - {}", record.summary());
    }
    out
}

pub fn render_dashboard(state: &DashboardState) -> String {
    let mut out = String::new();
    match &state.this_node {
        Some(me) => {
            let _ = writeln!(out, "Node: {me}");
        }
        None => out.push_str("Node: (unknown)\n"),
    }

    let _ = writeln!(out, "Peers ({})", state.peers.len());
    for peer in &state.peers {
        let _ = writeln!(out, "  - {peer}");
    }

    out.push_str(&render_records("Obligations", &state.obligations));
    out.push_str(&render_records("My obligations", &state.my_obligations));

    for failure in &state.load_failures {
        let _ = writeln!(out, "! could not load {}: {}", failure.source, failure.message);
    }
    out
}
