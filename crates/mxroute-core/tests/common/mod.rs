//! Test doubles and common utilities for contract tests
//!
//! This module provides an in-memory control panel and resolver that record
//! every call, so tests can assert exactly which remote calls were made.

#![allow(dead_code)]

use mxroute_core::error::{Error, Result};
use mxroute_core::forwarders::split_address;
use mxroute_core::traits::{ControlPanel, DnsRecord, TxtResolver};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct PanelState {
    domains: Vec<String>,
    mailboxes: BTreeMap<String, Vec<String>>,
    forwarders: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    dns: BTreeMap<String, Vec<DnsRecord>>,
}

/// A mock ControlPanel backed by in-memory account state
pub struct MockPanel {
    state: Arc<Mutex<PanelState>>,
    /// Call counter for list_domains()
    list_domains_calls: Arc<AtomicUsize>,
    /// Call counter for list_forwarders()
    list_forwarders_calls: Arc<AtomicUsize>,
    /// Recorded writes, as "create user@domain" / "modify user@domain"
    writes: Arc<Mutex<Vec<String>>>,
    /// Addresses whose writes fail
    failing: Arc<Mutex<HashSet<String>>>,
    /// When set, every call fails with Error::Authentication
    reject_credentials: Arc<AtomicBool>,
    /// Writes accepted before the credentials stop working
    write_budget: Arc<AtomicUsize>,
}

impl MockPanel {
    pub fn new(domains: &[&str]) -> Self {
        let state = PanelState {
            domains: domains.iter().map(|d| d.to_string()).collect(),
            ..PanelState::default()
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            list_domains_calls: Arc::new(AtomicUsize::new(0)),
            list_forwarders_calls: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            reject_credentials: Arc::new(AtomicBool::new(false)),
            write_budget: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// Create a new MockPanel that shares state and counters with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            state: Arc::clone(&other.state),
            list_domains_calls: Arc::clone(&other.list_domains_calls),
            list_forwarders_calls: Arc::clone(&other.list_forwarders_calls),
            writes: Arc::clone(&other.writes),
            failing: Arc::clone(&other.failing),
            reject_credentials: Arc::clone(&other.reject_credentials),
            write_budget: Arc::clone(&other.write_budget),
        }
    }

    /// Add an existing forwarder
    pub fn with_forwarder(self, address: &str, destinations: &[&str]) -> Self {
        let (user, domain) = split_address(address).expect("test address is user@domain");
        self.state
            .lock()
            .unwrap()
            .forwarders
            .entry(domain.to_string())
            .or_default()
            .insert(
                user.to_string(),
                destinations.iter().map(|d| d.to_string()).collect(),
            );
        self
    }

    /// Add mailboxes to a domain
    pub fn with_mailboxes(self, domain: &str, users: &[&str]) -> Self {
        self.state.lock().unwrap().mailboxes.insert(
            domain.to_string(),
            users.iter().map(|u| u.to_string()).collect(),
        );
        self
    }

    /// Add a DNS record to a domain's zone
    pub fn with_dns_record(self, domain: &str, record: DnsRecord) -> Self {
        self.state
            .lock()
            .unwrap()
            .dns
            .entry(domain.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Make writes to `address` fail
    pub fn fail_writes_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    /// Make every call fail with an authentication error
    pub fn reject_credentials(&self) {
        self.reject_credentials.store(true, Ordering::SeqCst);
    }

    /// Accept `writes` more writes, then reject the credentials
    pub fn revoke_credentials_after(&self, writes: usize) {
        let made = self.writes.lock().unwrap().len();
        self.write_budget.store(made + writes, Ordering::SeqCst);
    }

    pub fn list_domains_calls(&self) -> usize {
        self.list_domains_calls.load(Ordering::SeqCst)
    }

    pub fn list_forwarders_calls(&self) -> usize {
        self.list_forwarders_calls.load(Ordering::SeqCst)
    }

    /// Writes made so far, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Current destinations of `address`
    pub fn forwarder(&self, address: &str) -> Option<Vec<String>> {
        let (user, domain) = split_address(address)?;
        self.state
            .lock()
            .unwrap()
            .forwarders
            .get(domain)?
            .get(user)
            .cloned()
    }

    /// Number of forwarders on the account
    pub fn forwarder_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .forwarders
            .values()
            .map(BTreeMap::len)
            .sum()
    }

    fn check_credentials(&self) -> Result<()> {
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(Error::auth("invalid login key"));
        }
        Ok(())
    }

    fn write(&self, kind: &str, domain: &str, user: &str, destinations: &[String]) -> Result<()> {
        self.check_credentials()?;
        if self.writes.lock().unwrap().len() >= self.write_budget.load(Ordering::SeqCst) {
            return Err(Error::auth("login key revoked"));
        }
        let address = format!("{}@{}", user, domain);
        self.writes
            .lock()
            .unwrap()
            .push(format!("{} {}", kind, address));

        if self.failing.lock().unwrap().contains(&address) {
            return Err(Error::panel("mock", format!("cannot write {}", address)));
        }

        let mut state = self.state.lock().unwrap();
        let forwarders = state.forwarders.entry(domain.to_string()).or_default();
        match (kind, forwarders.contains_key(user)) {
            ("create", true) => Err(Error::panel("mock", "forwarder already exists")),
            ("modify", false) => Err(Error::panel("mock", "forwarder does not exist")),
            _ => {
                forwarders.insert(user.to_string(), destinations.to_vec());
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl ControlPanel for MockPanel {
    async fn list_domains(&self) -> Result<Vec<String>> {
        self.check_credentials()?;
        self.list_domains_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().domains.clone())
    }

    async fn list_mailboxes(&self, domain: &str) -> Result<Vec<String>> {
        self.check_credentials()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .mailboxes
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_forwarders(&self, domain: &str) -> Result<BTreeMap<String, Vec<String>>> {
        self.check_credentials()?;
        self.list_forwarders_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .lock()
            .unwrap()
            .forwarders
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_dns_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        self.check_credentials()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .dns
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_forwarder(
        &self,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<()> {
        self.write("create", domain, user, destinations)
    }

    async fn modify_forwarder(
        &self,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<()> {
        self.write("modify", domain, user, destinations)
    }

    fn panel_name(&self) -> &'static str {
        "mock"
    }
}

/// A TxtResolver answering from a fixed table
#[derive(Default)]
pub struct StaticResolver {
    records: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    lookups: Arc<AtomicUsize>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_txt(mut self, name: &str, value: &str) -> Self {
        self.records
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Make lookups of `name` fail with a resolver error
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TxtResolver for StaticResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(name) {
            return Err(Error::dns(format!("SERVFAIL for {}", name)));
        }
        Ok(self.records.get(name).cloned().unwrap_or_default())
    }
}

/// Build a sync engine over a panel sharing state with `panel`
pub fn engine_for(panel: &MockPanel) -> mxroute_core::SyncEngine {
    let (engine, _event_rx) = mxroute_core::SyncEngine::new(
        Box::new(MockPanel::sharing_state_with(panel)),
        mxroute_core::SyncConfig::default(),
    )
    .expect("engine construction succeeds");
    engine
}
