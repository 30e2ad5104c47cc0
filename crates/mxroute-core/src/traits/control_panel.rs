// # Control Panel Trait
//
// Defines the interface to the hosting control panel's account API.
//
// ## Implementations
//
// - DirectAdmin (as run by MXRoute): `mxroute-directadmin` crate
//
// ## Usage
//
// ```rust,ignore
// use mxroute_core::ControlPanel;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let panel = /* ControlPanel implementation */;
//
//     for domain in panel.list_domains().await? {
//         let forwarders = panel.list_forwarders(&domain).await?;
//         println!("{}: {} forwarder(s)", domain, forwarders.len());
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;

/// One DNS record as held by the control panel's zone editor
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DnsRecord {
    /// Record name, usually relative to the zone (e.g. `x._domainkey`)
    pub name: String,
    /// Record type (`TXT`, `MX`, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value exactly as the panel stores it
    pub value: String,
}

impl DnsRecord {
    /// Create a DNS record
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
        }
    }
}

/// Trait for control panel implementations
///
/// # Contract
///
/// Implementations are single-shot: each method issues the API call(s) it
/// names and returns the answer. They do not retry, back off, or cache
/// anything between calls. Deciding whether a write is needed belongs to the
/// caller ([`SyncEngine`](crate::engine::SyncEngine)).
///
/// Rejected credentials must surface as
/// [`Error::Authentication`](crate::Error::Authentication) so callers can
/// abort instead of continuing with later calls.
#[async_trait]
pub trait ControlPanel: Send + Sync {
    /// List every domain hosted on the account
    async fn list_domains(&self) -> Result<Vec<String>, crate::Error>;

    /// List the mailbox user names (the part before `@`) of a domain
    async fn list_mailboxes(&self, domain: &str) -> Result<Vec<String>, crate::Error>;

    /// List a domain's forwarders as user name → destinations
    async fn list_forwarders(
        &self,
        domain: &str,
    ) -> Result<BTreeMap<String, Vec<String>>, crate::Error>;

    /// List the DNS records the panel holds for a domain
    async fn list_dns_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a forwarder for `user@domain`
    async fn create_forwarder(
        &self,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<(), crate::Error>;

    /// Replace the destinations of the existing forwarder `user@domain`
    async fn modify_forwarder(
        &self,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<(), crate::Error>;

    /// Get the panel name (for logging/debugging)
    fn panel_name(&self) -> &'static str;
}
