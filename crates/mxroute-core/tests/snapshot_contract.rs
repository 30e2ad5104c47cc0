//! Contract Test: Account Snapshot
//!
//! Constraints verified:
//! - A snapshot costs one domain list call plus one call per domain and list
//! - Listings come back grouped by domain in panel order

mod common;

use common::*;
use mxroute_core::{AccountSnapshot, FetchScope};

#[tokio::test]
async fn fetch_all_lists_everything() {
    let panel = MockPanel::new(&["x.com", "y.org"])
        .with_mailboxes("x.com", &["info", "sales"])
        .with_mailboxes("y.org", &["me"])
        .with_forwarder("team@x.com", &["info@x.com", "sales@x.com"])
        .with_forwarder("all@y.org", &["me@y.org"]);

    let snapshot = AccountSnapshot::fetch(&panel, FetchScope::ALL).await.unwrap();

    assert_eq!(snapshot.domains(), ["x.com", "y.org"]);
    assert_eq!(
        snapshot.mailbox_addresses(),
        ["info@x.com", "sales@x.com", "me@y.org"]
    );
    let lines: Vec<String> = snapshot
        .forwarder_entries()
        .iter()
        .map(|e| e.to_line())
        .collect();
    assert_eq!(
        lines,
        ["team@x.com --> info@x.com,sales@x.com", "all@y.org --> me@y.org"]
    );
    assert_eq!(panel.list_domains_calls(), 1);
    assert_eq!(panel.list_forwarders_calls(), 2);
}

#[tokio::test]
async fn domains_scope_skips_per_domain_calls() {
    let panel = MockPanel::new(&["x.com", "y.org"]).with_forwarder("a@x.com", &["b@x.com"]);

    let snapshot = AccountSnapshot::fetch(&panel, FetchScope::DOMAINS).await.unwrap();

    assert_eq!(snapshot.domains().len(), 2);
    assert!(snapshot.forwarder_entries().is_empty());
    assert_eq!(panel.list_forwarders_calls(), 0);
}
