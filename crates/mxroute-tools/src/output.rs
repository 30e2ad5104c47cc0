//! Plain-text rendering of command results
//!
//! Everything here returns a `String` so `main` decides where it goes.

use mxroute_core::engine::SyncReport;
use mxroute_core::forwarders::SEPARATOR;
use mxroute_core::{ChangeAction, DkimReport, DkimStatus, ForwarderEntry};
use std::fmt::Write;

/// `# <title> (N)`, one item per line, then a blank line
fn section<I, S>(title: &str, items: I) -> String
where
    I: ExactSizeIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = format!("# {} ({})\n", title, items.len());
    for item in items {
        out.push_str(item.as_ref());
        out.push('\n');
    }
    out.push('\n');
    out
}

pub fn domains(domains: &[String]) -> String {
    section("Domains", domains.iter())
}

pub fn mailboxes(addresses: &[String]) -> String {
    section("Email Accounts", addresses.iter())
}

pub fn forwarders(entries: &[ForwarderEntry]) -> String {
    section("Forwarders", entries.iter().map(ForwarderEntry::to_line))
}

pub fn dkim(reports: &[DkimReport]) -> String {
    let mut out = String::from("* DKIM settings\n");
    for report in reports {
        let verdict = match report.status {
            DkimStatus::Correct => "DNS CORRECT",
            DkimStatus::Mismatch => "DNS SETUP",
            DkimStatus::Missing => "DNS FAILURE",
            DkimStatus::NotConfigured => "DKIM NOT CONFIGURED",
        };
        let _ = writeln!(out, "** {} for {}", verdict, report.domain);
        if let Some(record) = report.suggested_record() {
            let _ = writeln!(out, "{}\n", record);
        }
    }
    out
}

/// Per-entry lines for stdout and failure lines for stderr
pub struct SyncOutput {
    pub stdout: String,
    pub stderr: String,
}

pub fn sync(report: &SyncReport, dry_run: bool) -> SyncOutput {
    let mut stdout = String::new();
    let mut stderr = String::new();

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => {
                let _ = writeln!(
                    stdout,
                    "{} {} {} {}",
                    outcome.change.action,
                    outcome.change.address(),
                    SEPARATOR,
                    outcome.change.destinations().join(",")
                );
            }
            Err(e) => {
                let _ = writeln!(stderr, "FAILED {}: {}", outcome.change.address(), e);
            }
        }
    }
    for rejected in &report.rejected {
        let _ = writeln!(
            stderr,
            "FAILED {}: {}",
            rejected.entry.address(),
            rejected.error
        );
    }
    if let Some(e) = &report.aborted {
        let _ = writeln!(stderr, "ABORTED: {}", e);
    }

    let _ = writeln!(
        stdout,
        "{}{} created, {} updated, {} unchanged, {} failed",
        if dry_run { "[dry-run] " } else { "" },
        report.succeeded(ChangeAction::Create).count(),
        report.succeeded(ChangeAction::Update).count(),
        report.succeeded(ChangeAction::Unchanged).count(),
        report.failure_count()
    );

    SyncOutput { stdout, stderr }
}
