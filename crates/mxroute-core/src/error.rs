//! Error types for mxroute-tools
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for mxroute operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a forwarder line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The line has no `-->` separator
    #[error("missing '-->' separator")]
    MissingSeparator,

    /// The line has more than one `-->` separator
    #[error("more than one '-->' separator")]
    ExtraSeparator,

    /// The local address is not of the form `user@domain`
    #[error("local address '{0}' must be of the form user@domain")]
    InvalidLocalAddress(String),

    /// Nothing remained on the right-hand side after trimming
    #[error("no destination addresses")]
    NoDestinations,
}

/// A malformed line in a forwarder list document
///
/// `line` is 1-based so it can be reported to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct FormatError {
    /// 1-based line number in the input document
    pub line: usize,
    /// What was wrong with the line
    pub kind: FormatErrorKind,
}

impl FormatError {
    /// Create a format error for the given 1-based line
    pub fn new(line: usize, kind: FormatErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Core error type for mxroute-tools
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed forwarder list input
    #[error("Invalid forwarder list: {0}")]
    Format(#[from] FormatError),

    /// The control panel rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A single forwarder create/modify call failed
    #[error("Failed to write forwarder {address}: {message}")]
    RemoteWrite {
        /// The local address being written
        address: String,
        /// Error reported by the control panel or transport
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (reading input documents)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport or status errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// The control panel answered with a body we could not understand
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// DNS lookup errors
    #[error("DNS error: {0}")]
    Dns(String),

    /// Domain or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Control panel reported an error of its own
    #[error("Panel error ({panel}): {message}")]
    Panel {
        /// Panel name
        panel: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a DNS error
    pub fn dns(msg: impl Into<String>) -> Self {
        Self::Dns(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a panel-specific error
    pub fn panel(panel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panel {
            panel: panel.into(),
            message: message.into(),
        }
    }

    /// Create a remote write error for one forwarder
    pub fn remote_write(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteWrite {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the credentials were rejected
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}
