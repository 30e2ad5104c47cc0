// # DirectAdmin Control Panel
//
// This crate provides the DirectAdmin implementation of `ControlPanel`, as
// used by MXRoute's mail hosting servers.
//
// ## Behavior
//
// - One HTTP request per trait call
// - HTTP basic auth with the account username and password or login key
// - `json=yes` on every request so DirectAdmin answers in JSON
// - 10 second timeout per request
// - Dry-run mode: reads go out, writes are logged and skipped
// - No retry, no caching (callers decide what to send)
//
// ## Security Requirements
//
// - The password NEVER appears in logs or Debug output
//
// ## API Reference
//
// - List domains: GET `/CMD_API_SHOW_DOMAINS`
// - List mailboxes: GET `/CMD_API_POP?action=list&domain=...`
// - List forwarders: GET `/CMD_API_EMAIL_FORWARDERS?action=list&domain=...`
// - Zone records: GET `/CMD_API_DNS_CONTROL?domain=...`
// - Create / modify forwarder: POST `/CMD_API_EMAIL_FORWARDERS`
//   with `action=create|modify&domain=...&user=...&email=a,b`

pub mod decode;

use async_trait::async_trait;
use mxroute_core::config::PanelConfig;
use mxroute_core::traits::{ControlPanel, DnsRecord};
use mxroute_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// List hosted domains
const SHOW_DOMAINS_CMD: &str = "CMD_API_SHOW_DOMAINS";
/// Mailbox (POP/IMAP account) management
const POP_CMD: &str = "CMD_API_POP";
/// Forwarder management
const FORWARDERS_CMD: &str = "CMD_API_EMAIL_FORWARDERS";
/// Zone editor
const DNS_CMD: &str = "CMD_API_DNS_CONTROL";

/// DirectAdmin control panel client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client will:
/// - Perform all GET requests
/// - Log the intended POST payload
/// - **NOT** create or modify forwarders
pub struct DirectAdminPanel {
    /// Base URL, e.g. `https://maildemo.mxrouting.net:2222`
    base_url: String,

    /// Login username
    username: String,

    /// Password or login key
    /// ⚠️ NEVER log this value
    password: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip POST writes
    dry_run: bool,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for DirectAdminPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectAdminPanel")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DirectAdminPanel {
    /// Create a client from configuration
    ///
    /// The configuration is validated first; an empty password is rejected.
    pub fn new(config: &PanelConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            tracing::warn!("DirectAdmin client running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
            dry_run: config.dry_run,
        })
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn command_url(&self, cmd: &str) -> String {
        format!("{}/{}", self.base_url, cmd)
    }

    /// Issue a GET for `cmd` and decode the JSON answer
    async fn get(&self, cmd: &str, params: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!("GET {} {:?}", cmd, params);

        let response = self
            .client
            .get(self.command_url(cmd))
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/json")
            .query(&[("json", "yes")])
            .query(params)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", cmd, e)))?;

        Self::read_response(cmd, response).await
    }

    /// Issue a form POST for `cmd` and decode the JSON answer
    async fn post(&self, cmd: &str, form: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!("POST {} {:?}", cmd, form);

        let response = self
            .client
            .post(self.command_url(cmd))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("json", "yes")])
            .form(form)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", cmd, e)))?;

        Self::read_response(cmd, response).await
    }

    async fn read_response(cmd: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", cmd, e)))?;

        if !status.is_success() {
            return Err(decode::status_error(status.as_u16(), &body));
        }

        decode::decode_body(&body)
    }

    /// Create or modify a forwarder (or log it in dry-run mode)
    async fn write_forwarder(
        &self,
        action: &str,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<()> {
        let email = destinations.join(",");
        let form = [
            ("action", action),
            ("domain", domain),
            ("user", user),
            ("email", email.as_str()),
        ];

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would POST {} with action={} domain={} user={} email={}",
                FORWARDERS_CMD,
                action,
                domain,
                user,
                email
            );
            return Ok(());
        }

        self.post(FORWARDERS_CMD, &form).await?;
        tracing::info!("Forwarder {}@{} {}d", user, domain, action);
        Ok(())
    }
}

#[async_trait]
impl ControlPanel for DirectAdminPanel {
    async fn list_domains(&self) -> Result<Vec<String>> {
        let value = self.get(SHOW_DOMAINS_CMD, &[]).await?;
        decode::decode_string_list(&value)
    }

    async fn list_mailboxes(&self, domain: &str) -> Result<Vec<String>> {
        let value = self
            .get(POP_CMD, &[("action", "list"), ("domain", domain)])
            .await?;
        decode::decode_string_list(&value)
    }

    async fn list_forwarders(&self, domain: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let value = self
            .get(FORWARDERS_CMD, &[("action", "list"), ("domain", domain)])
            .await?;
        decode::decode_forwarders(&value)
    }

    async fn list_dns_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let value = self.get(DNS_CMD, &[("domain", domain)]).await?;
        decode::decode_dns_records(&value)
    }

    async fn create_forwarder(
        &self,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<()> {
        self.write_forwarder("create", domain, user, destinations)
            .await
    }

    async fn modify_forwarder(
        &self,
        domain: &str,
        user: &str,
        destinations: &[String],
    ) -> Result<()> {
        self.write_forwarder("modify", domain, user, destinations)
            .await
    }

    fn panel_name(&self) -> &'static str {
        "directadmin"
    }
}
