//! Configuration types for mxroute-tools
//!
//! Credentials and endpoint settings are carried explicitly in a
//! [`PanelConfig`] value handed to the control panel client. Nothing here
//! is process-global.

use serde::{Deserialize, Serialize};

/// Domain suffix of MXRoute's DirectAdmin servers
pub const MXROUTE_HOST_SUFFIX: &str = ".mxrouting.net";

/// Port DirectAdmin listens on
pub const DIRECTADMIN_PORT: u16 = 2222;

/// Control panel connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Server name. A short name such as `maildemo` expands to
    /// `maildemo.mxrouting.net`; a dotted name is used as-is.
    pub host: String,

    /// Login username
    pub username: String,

    /// Password or login key
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Full base URL overriding `host` (e.g. `https://panel.example.net:2222`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Perform reads only and log the writes that would have been made
    #[serde(default)]
    pub dry_run: bool,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl PanelConfig {
    /// Create a configuration with default timeout, live mode
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.username.is_empty() {
            return Err(crate::Error::config("Username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(crate::Error::config("Password or login key cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }

        match &self.base_url {
            Some(url) => {
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "Base URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
            }
            None => {
                if self.host.is_empty() {
                    return Err(crate::Error::config("Server host cannot be empty"));
                }
                if self.host.contains("://") || self.host.contains('/') {
                    return Err(crate::Error::config(format!(
                        "Server host must be a bare name such as 'maildemo'. Got: {}",
                        self.host
                    )));
                }
            }
        }

        Ok(())
    }

    /// The URL every `CMD_API_*` command is appended to, without trailing slash
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }

        if self.host.contains('.') {
            format!("https://{}:{}", self.host, DIRECTADMIN_PORT)
        } else {
            format!(
                "https://{}{}:{}",
                self.host, MXROUTE_HOST_SUFFIX, DIRECTADMIN_PORT
            )
        }
    }
}

/// Sync engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Capacity of the sync event channel
    ///
    /// When full, events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_event_channel_capacity() -> usize {
    256
}
