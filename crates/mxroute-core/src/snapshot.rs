//! Point-in-time view of a control panel account
//!
//! An [`AccountSnapshot`] is what the panel reported at fetch time: hosted
//! domains, mailboxes and forwarders. It is never refreshed; fetch a new one
//! instead.

use crate::error::Result;
use crate::forwarders::{ForwarderEntry, split_address};
use crate::traits::ControlPanel;
use std::collections::BTreeMap;
use tracing::debug;

/// Which per-domain lists [`AccountSnapshot::fetch`] should load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchScope {
    /// Fetch mailboxes of every domain
    pub mailboxes: bool,
    /// Fetch forwarders of every domain
    pub forwarders: bool,
}

impl FetchScope {
    /// Domains only
    pub const DOMAINS: Self = Self {
        mailboxes: false,
        forwarders: false,
    };

    /// Domains, mailboxes and forwarders
    pub const ALL: Self = Self {
        mailboxes: true,
        forwarders: true,
    };
}

/// Domains, mailboxes and forwarders held by an account
///
/// Per-domain maps are keyed by the ASCII-lowercased domain; the original
/// spelling is kept in [`domains`](Self::domains).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSnapshot {
    domains: Vec<String>,
    mailboxes: BTreeMap<String, Vec<String>>,
    forwarders: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl AccountSnapshot {
    /// Create a snapshot holding only a domain list
    pub fn new(domains: Vec<String>) -> Self {
        Self {
            domains,
            ..Self::default()
        }
    }

    /// Build a snapshot from forwarder entries, adding their domains
    pub fn from_forwarders(entries: impl IntoIterator<Item = ForwarderEntry>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            let domain = entry.domain().to_string();
            if snapshot.hosted_domain(&domain).is_none() {
                snapshot.domains.push(domain.clone());
            }
            snapshot
                .forwarders
                .entry(domain.to_ascii_lowercase())
                .or_default()
                .insert(entry.user().to_string(), entry.destinations().to_vec());
        }
        snapshot
    }

    /// Fetch the domain list and the per-domain lists selected by `scope`
    ///
    /// Issues one call for the domains plus one call per domain and list.
    pub async fn fetch(panel: &dyn ControlPanel, scope: FetchScope) -> Result<Self> {
        let mut snapshot = Self::new(panel.list_domains().await?);
        debug!(
            "{} reports {} domain(s)",
            panel.panel_name(),
            snapshot.domains.len()
        );

        for domain in snapshot.domains.clone() {
            if scope.mailboxes {
                let users = panel.list_mailboxes(&domain).await?;
                snapshot.insert_mailboxes(&domain, users);
            }
            if scope.forwarders {
                let forwarders = panel.list_forwarders(&domain).await?;
                snapshot.insert_forwarders(&domain, forwarders);
            }
        }

        Ok(snapshot)
    }

    /// Record the mailboxes of a domain
    pub fn insert_mailboxes(&mut self, domain: &str, users: Vec<String>) {
        self.mailboxes.insert(domain.to_ascii_lowercase(), users);
    }

    /// Record the forwarders of a domain
    pub fn insert_forwarders(&mut self, domain: &str, forwarders: BTreeMap<String, Vec<String>>) {
        self.forwarders
            .insert(domain.to_ascii_lowercase(), forwarders);
    }

    /// Hosted domains, in the order the panel listed them
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// The hosted spelling of `domain`, matched case-insensitively
    pub fn hosted_domain(&self, domain: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|d| d.eq_ignore_ascii_case(domain))
            .map(String::as_str)
    }

    /// Every mailbox as `user@domain`, grouped by domain
    pub fn mailbox_addresses(&self) -> Vec<String> {
        self.domains
            .iter()
            .filter_map(|domain| {
                self.mailboxes
                    .get(&domain.to_ascii_lowercase())
                    .map(|users| (domain, users))
            })
            .flat_map(|(domain, users)| {
                users
                    .iter()
                    .map(move |user| format!("{}@{}", user, domain))
            })
            .collect()
    }

    /// Every forwarder, grouped by domain
    pub fn forwarder_entries(&self) -> Vec<ForwarderEntry> {
        self.domains
            .iter()
            .filter_map(|domain| {
                self.forwarders
                    .get(&domain.to_ascii_lowercase())
                    .map(|forwarders| (domain, forwarders))
            })
            .flat_map(|(domain, forwarders)| {
                forwarders.iter().map(move |(user, destinations)| {
                    ForwarderEntry::new(format!("{}@{}", user, domain), destinations.clone())
                })
            })
            .collect()
    }

    /// Current destinations of the forwarder at `address`, if one exists
    pub fn forwarder(&self, address: &str) -> Option<&[String]> {
        let (user, domain) = split_address(address)?;
        self.forwarders
            .get(&domain.to_ascii_lowercase())?
            .get(user)
            .map(Vec::as_slice)
    }
}
