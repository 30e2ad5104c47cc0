//! Contract Test: Reconciliation Decisions
//!
//! Constraints verified:
//! - Create for absent forwarders, Update for changed destination sets,
//!   Unchanged (and no write) for identical ones
//! - One domain list call and one forwarder list call per affected domain
//! - One write call per changed forwarder
//! - Entries for domains the account does not host are rejected, not written

mod common;

use common::*;
use mxroute_core::forwarders::parse;
use mxroute_core::{ChangeAction, Error};

#[tokio::test]
async fn added_destination_becomes_update() {
    let panel = MockPanel::new(&["x.com"]).with_forwarder("a@x.com", &["b@x.com"]);
    let engine = engine_for(&panel);

    let plan = engine
        .plan(&parse("a@x.com --> b@x.com,c@x.com").unwrap())
        .await
        .unwrap();

    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.changes[0].action, ChangeAction::Update);
    assert_eq!(plan.changes[0].destinations(), ["b@x.com", "c@x.com"]);

    let report = engine.apply(plan).await.unwrap();
    assert!(report.is_success());
    assert_eq!(
        panel.forwarder("a@x.com"),
        Some(vec!["b@x.com".to_string(), "c@x.com".to_string()])
    );
}

#[tokio::test]
async fn identical_forwarder_is_not_sent() {
    let panel = MockPanel::new(&["x.com"]).with_forwarder("a@x.com", &["b@x.com"]);

    let report = engine_for(&panel)
        .sync(&parse("a@x.com --> b@x.com").unwrap())
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].change.action, ChangeAction::Unchanged);
    assert!(panel.writes().is_empty(), "Unchanged entries must not be written");
}

#[tokio::test]
async fn absent_forwarder_becomes_create() {
    let panel = MockPanel::new(&["x.com"]);

    let report = engine_for(&panel)
        .sync(&parse("new@x.com --> dest@x.com").unwrap())
        .await
        .unwrap();

    assert_eq!(report.succeeded(ChangeAction::Create).count(), 1);
    assert_eq!(panel.writes(), ["create new@x.com"]);
    assert_eq!(panel.forwarder("new@x.com"), Some(vec!["dest@x.com".to_string()]));
}

#[tokio::test]
async fn one_list_call_per_domain() {
    let panel = MockPanel::new(&["x.com", "y.org", "unused.net"]);
    let desired = parse(
        "a@x.com --> d@x.com\n\
         b@x.com --> d@x.com\n\
         c@y.org --> d@x.com\n\
         e@X.COM --> d@x.com\n",
    )
    .unwrap();

    engine_for(&panel).plan(&desired).await.unwrap();

    assert_eq!(panel.list_domains_calls(), 1);
    assert_eq!(
        panel.list_forwarders_calls(),
        2,
        "Expected one forwarder list per affected domain"
    );
}

#[tokio::test]
async fn one_write_per_changed_forwarder() {
    let panel = MockPanel::new(&["x.com"])
        .with_forwarder("same@x.com", &["d@x.com"])
        .with_forwarder("changed@x.com", &["d@x.com"]);
    let desired = parse(
        "same@x.com --> d@x.com\n\
         changed@x.com --> e@x.com\n\
         fresh@x.com --> d@x.com\n",
    )
    .unwrap();

    let report = engine_for(&panel).sync(&desired).await.unwrap();

    assert_eq!(panel.writes(), ["modify changed@x.com", "create fresh@x.com"]);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(ChangeAction::Unchanged).count(), 1);
    assert_eq!(report.succeeded(ChangeAction::Update).count(), 1);
    assert_eq!(report.succeeded(ChangeAction::Create).count(), 1);
}

#[tokio::test]
async fn unhosted_domain_is_rejected_without_write() {
    let panel = MockPanel::new(&["x.com"]);
    let desired = parse("a@elsewhere.net --> b@x.com\nc@x.com --> b@x.com\n").unwrap();

    let report = engine_for(&panel).sync(&desired).await.unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].entry.address(), "a@elsewhere.net");
    assert!(matches!(report.rejected[0].error, Error::NotFound(_)));
    assert_eq!(panel.writes(), ["create c@x.com"]);
    assert!(!report.is_success());
}

#[tokio::test]
async fn writes_use_the_panel_spelling_of_the_domain() {
    let panel = MockPanel::new(&["x.com"]);

    engine_for(&panel)
        .sync(&parse("a@X.Com --> b@x.com").unwrap())
        .await
        .unwrap();

    assert_eq!(panel.writes(), ["create a@x.com"]);
}

#[tokio::test]
async fn rejected_credentials_abort_planning() {
    let panel = MockPanel::new(&["x.com"]);
    panel.reject_credentials();

    let err = engine_for(&panel)
        .plan(&parse("a@x.com --> b@x.com").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_authentication());
    assert!(panel.writes().is_empty());
}
